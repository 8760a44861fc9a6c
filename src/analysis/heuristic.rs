//! Offline heuristic pass over a classified trace.

use std::sync::OnceLock;

use regex::Regex;

use crate::trace::{Role, Trace};
use crate::utils::truncate_with_ellipsis;

use super::types::HeuristicResult;

pub const HELP_OBSERVATION: &str = "Agent used help flag to understand the CLI";
pub const ERROR_MESSAGES_RECOMMENDATION: &str =
    "Consider improving error messages to be more actionable";
pub const HELP_DISCOVERY_RECOMMENDATION: &str =
    "Agent didn't use --help flag; consider making help more discoverable";

/// Errors beyond this count trigger the error-message recommendation.
const ERROR_RECOMMENDATION_THRESHOLD: usize = 2;
const ERROR_EXCERPT_CHARS: usize = 100;
const EVIDENCE_CHARS: usize = 300;

fn help_flag_regex() -> Option<&'static Regex> {
    static HELP: OnceLock<Option<Regex>> = OnceLock::new();
    HELP.get_or_init(|| Regex::new(r"(^|[\s'\x22`])(--help|-h)\b").ok())
        .as_ref()
}

fn mentions_help(text: &str) -> bool {
    help_flag_regex().is_some_and(|re| re.is_match(text))
}

fn mentions_error(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("error:") || lower.contains("failed")
}

/// Analyzes a trace without any I/O. Deterministic and infallible.
pub fn analyze_trace(trace: &Trace) -> HeuristicResult {
    let mut total_turns = 0;
    let mut help_used = false;
    let mut errors_encountered = Vec::new();
    let mut observations = Vec::new();
    let mut recommendations = Vec::new();

    for event in trace.iter().filter(|e| e.role == Role::Assistant) {
        total_turns += 1;

        if !help_used && mentions_help(&event.raw_content) {
            help_used = true;
            observations.push(HELP_OBSERVATION.to_string());
        }
        if mentions_error(&event.raw_content) {
            errors_encountered.push(format!(
                "{}...",
                crate::utils::truncate_chars(&event.raw_content, ERROR_EXCERPT_CHARS)
            ));
        }
    }

    let terminal = trace.terminal();
    let success = terminal.is_some_and(|t| t.is_terminal_success());

    if errors_encountered.len() > ERROR_RECOMMENDATION_THRESHOLD {
        recommendations.push(ERROR_MESSAGES_RECOMMENDATION.to_string());
    }
    if !help_used && !success {
        recommendations.push(HELP_DISCOVERY_RECOMMENDATION.to_string());
    }

    HeuristicResult {
        total_turns,
        success,
        trace_length: trace.len(),
        help_used,
        errors_encountered,
        observations,
        recommendations,
        evidence_summary: terminal
            .map(|t| truncate_with_ellipsis(&t.raw_content, EVIDENCE_CHARS))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceEvent;
    use serde_json::json;

    fn trace_of(events: Vec<TraceEvent>) -> Trace {
        events.into_iter().collect()
    }

    #[test]
    fn test_empty_trace_fails() {
        let result = analyze_trace(&Trace::new());
        assert_eq!(result.total_turns, 0);
        assert!(!result.success);
        assert_eq!(result.trace_length, 0);
    }

    #[test]
    fn test_success_terminal() {
        let trace = trace_of(vec![
            TraceEvent::assistant("running gh pr create"),
            TraceEvent::result("success", "done"),
        ]);
        let result = analyze_trace(&trace);
        assert!(result.success);
        assert_eq!(result.total_turns, 1);
        assert_eq!(result.evidence_summary, "done");
    }

    #[test]
    fn test_non_success_terminal() {
        let trace = trace_of(vec![
            TraceEvent::assistant("a"),
            TraceEvent::result("error_max_turns", ""),
        ]);
        assert!(!analyze_trace(&trace).success);
    }

    #[test]
    fn test_missing_terminal() {
        let trace = trace_of(vec![TraceEvent::assistant("a"), TraceEvent::other("tool")]);
        assert!(!analyze_trace(&trace).success);
    }

    #[test]
    fn test_turns_independent_of_event_shape() {
        let raw = vec![
            json!({"type": "assistant", "message": {"content": "one"}}),
            json!({"class": "AssistantMessage", "content": "two"}),
            json!({"role": "assistant", "content": "three"}),
            json!({"type": "user", "content": "tool output"}),
            json!({"type": "result", "subtype": "success"}),
        ];
        let trace = Trace::from_raw(&raw);
        let classified = trace.iter().filter(|e| e.role == Role::Assistant).count();
        let result = analyze_trace(&trace);
        assert_eq!(result.total_turns, 3);
        assert_eq!(result.total_turns, classified);
        assert_eq!(result.trace_length, 5);
    }

    #[test]
    fn test_help_detection_records_once() {
        let trace = trace_of(vec![
            TraceEvent::assistant("vercel --help"),
            TraceEvent::assistant("vercel deploy -h"),
            TraceEvent::result("success", ""),
        ]);
        let result = analyze_trace(&trace);
        assert!(result.help_used);
        assert_eq!(result.observations, vec![HELP_OBSERVATION.to_string()]);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_help_flag_not_matched_inside_words() {
        assert!(!mentions_help("docker run --hostname x"));
        assert!(!mentions_help("git log -hello"));
        assert!(mentions_help("run `gh -h`"));
    }

    #[test]
    fn test_error_recommendations() {
        let trace = trace_of(vec![
            TraceEvent::assistant("Error: not found"),
            TraceEvent::assistant("command failed"),
            TraceEvent::assistant("error: again"),
            TraceEvent::result("error_during_execution", ""),
        ]);
        let result = analyze_trace(&trace);
        assert_eq!(result.errors_encountered.len(), 3);
        assert!(result.errors_encountered[0].ends_with("..."));
        assert_eq!(
            result.recommendations,
            vec![
                ERROR_MESSAGES_RECOMMENDATION.to_string(),
                HELP_DISCOVERY_RECOMMENDATION.to_string()
            ]
        );
    }
}
