//! JSON span location for parsing reasoning-engine replies.
//!
//! Replies from the verifier engine are free text that usually, but not
//! always, carries a JSON object. This module only *locates* candidate spans;
//! deciding whether a span is a usable verdict is left to the parsers in
//! [`crate::verifier::parser`].
//!
//! # Example
//!
//! ```
//! use agentprobe::utils::json_extraction::{fenced_blocks, first_balanced_object};
//!
//! let reply = "Verdict:\n```json\n{\"actual_success\": true}\n```";
//! assert_eq!(fenced_blocks(reply), vec!["{\"actual_success\": true}"]);
//!
//! let inline = "I think {\"actual_success\": false} is right";
//! assert_eq!(first_balanced_object(inline), Some("{\"actual_success\": false}"));
//! ```

use std::sync::OnceLock;

use regex::Regex;

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    // Language tag is optional; `json`, `JSON` and bare fences are all accepted.
    FENCE
        .get_or_init(|| Regex::new(r"```[A-Za-z0-9_-]*[ \t]*\r?\n?([\s\S]*?)```").ok())
        .as_ref()
}

/// Returns the trimmed contents of every fenced code block, in order of appearance.
pub fn fenced_blocks(content: &str) -> Vec<&str> {
    let Some(re) = fence_regex() else {
        return Vec::new();
    };
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|block| !block.is_empty())
        .collect()
}

/// Finds the index of the `}` closing the object that starts at `s[0]`.
///
/// Handles nesting, string literals and escaped quotes inside strings.
pub fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Returns the first `{...}` span in `content` whose braces balance.
///
/// An opening brace that never closes is skipped and scanning resumes at the
/// next `{`. The returned span is not guaranteed to be valid JSON.
pub fn first_balanced_object(content: &str) -> Option<&str> {
    let mut offset = 0;
    while let Some(rel) = content[offset..].find('{') {
        let start = offset + rel;
        if let Some(end) = find_matching_brace(&content[start..]) {
            return Some(&content[start..=start + end]);
        }
        offset = start + 1;
    }
    None
}

/// Truncates `s` to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Like [`truncate_chars`] but marks the cut with a trailing ellipsis.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let cut = truncate_chars(s, max_chars);
    if cut.len() < s.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}
