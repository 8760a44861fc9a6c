//! Prompt construction for the verifier engine.

use crate::trace::Trace;
use crate::utils::truncate_chars;

/// Upper bound on the trace summary embedded in a prompt.
pub const MAX_SUMMARY_CHARS: usize = 8_000;

/// Verification prompt. Placeholders are substituted by [`build_prompt`].
const VERIFICATION_PROMPT_TEMPLATE: &str = r#"You are auditing an AI agent that was asked to complete a task with a command-line tool.
Decide whether the task ACTUALLY succeeded, based only on the evidence in the trace.
Do not trust the agent's own claims of success.

Tool: {tool}
Claimed outcome: {claimed}

Scenario given to the agent:
{scenario}

Execution trace (one line per event):
{trace}

Respond with ONLY a JSON object inside a ```json fenced block, in exactly this shape:
```json
{
  "actual_success": <true | false | null if it cannot be determined>,
  "discrepancy": <true if actual_success contradicts the claimed outcome>,
  "failure_reasons": ["<reason>", "..."],
  "help_used": <true | false | null>,
  "recommendations": ["<how the CLI could be friendlier to agents>", "..."],
  "analysis": "<short narrative of what happened>"
}
```"#;

/// Label for the claimed outcome as shown to the engine.
pub fn claimed_label(claimed: Option<bool>) -> &'static str {
    match claimed {
        Some(true) => "SUCCESS",
        Some(false) => "FAILURE",
        None => "UNKNOWN",
    }
}

/// One line per event as `index. [role] excerpt`, bounded by [`MAX_SUMMARY_CHARS`].
pub fn summarize_trace(trace: &Trace) -> String {
    let mut summary = String::new();

    for (index, event) in trace.iter().enumerate() {
        let excerpt = event.raw_content.split_whitespace().collect::<Vec<_>>().join(" ");
        let line = format!("{}. [{}] {}\n", index + 1, event.role, excerpt);

        if summary.len() + line.len() > MAX_SUMMARY_CHARS {
            let omitted = trace.len() - index;
            summary.push_str(&format!("... ({} more events omitted)\n", omitted));
            break;
        }
        summary.push_str(&line);
    }

    if summary.is_empty() {
        summary.push_str("(no events recorded)\n");
    }
    summary
}

/// Builds the full verification prompt.
pub fn build_prompt(scenario: &str, tool: &str, claimed: Option<bool>, summary: &str) -> String {
    VERIFICATION_PROMPT_TEMPLATE
        .replace("{tool}", tool)
        .replace("{claimed}", claimed_label(claimed))
        .replace("{trace}", truncate_chars(summary.trim_end(), MAX_SUMMARY_CHARS))
        .replace("{scenario}", scenario.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceEvent;

    #[test]
    fn test_summary_lines() {
        let trace: Trace = vec![
            TraceEvent::other("init"),
            TraceEvent::assistant("gh pr create\n--fill"),
            TraceEvent::result("success", "Created PR #12"),
        ]
        .into_iter()
        .collect();

        let summary = summarize_trace(&trace);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "1. [other] init",
                "2. [assistant] gh pr create --fill",
                "3. [result] Created PR #12",
            ]
        );
    }

    #[test]
    fn test_summary_is_bounded() {
        let trace: Trace = (0..100)
            .map(|i| TraceEvent::assistant(format!("{} {}", i, "y".repeat(400))))
            .collect();
        let summary = summarize_trace(&trace);
        assert!(summary.len() <= MAX_SUMMARY_CHARS + 64);
        assert!(summary.contains("more events omitted"));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(summarize_trace(&Trace::new()), "(no events recorded)\n");
    }

    #[test]
    fn test_prompt_embeds_context() {
        let prompt = build_prompt("Deploy the app", "vercel", Some(true), "1. [assistant] ls\n");
        assert!(prompt.contains("Tool: vercel"));
        assert!(prompt.contains("Claimed outcome: SUCCESS"));
        assert!(prompt.contains("Deploy the app"));
        assert!(prompt.contains("1. [assistant] ls"));
        assert!(prompt.contains("\"actual_success\""));
        assert!(prompt.contains("\"help_used\""));
        assert!(!prompt.contains("{trace}"));
    }

    #[test]
    fn test_claimed_labels() {
        assert_eq!(claimed_label(Some(false)), "FAILURE");
        assert_eq!(claimed_label(None), "UNKNOWN");
    }
}
