//! Classification of raw execution-engine events.
//!
//! The engine emits JSON records with no shared schema: stream-json lines
//! from the CLI, SDK-style objects tagged with a class name, or chat-style
//! messages carrying only a `role`. [`classify`] maps any of them onto a
//! [`TraceEvent`] with a closed [`Role`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::truncate_chars;

/// Maximum characters kept from any single event.
pub const MAX_EXCERPT_CHARS: usize = 500;

/// Value of the `type` tag marking an assistant turn.
const ASSISTANT_TYPE: &str = "assistant";
/// Value of the `type` tag marking the terminal result.
const RESULT_TYPE: &str = "result";
/// Type names used by SDK-style serializations.
const ASSISTANT_TYPE_NAME: &str = "AssistantMessage";
const RESULT_TYPE_NAME: &str = "ResultMessage";
/// Keys that may carry an SDK type name.
const TYPE_NAME_KEYS: &[&str] = &["class", "__class__", "kind", "message_type"];

/// Canonical role of a trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A turn produced by the agent.
    Assistant,
    /// The terminal result record that closes a run.
    Result,
    /// Anything else (system, user, tool output, unrecognized shapes).
    Other,
}

impl Role {
    /// Short label used in trace summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Assistant => "assistant",
            Role::Result => "result",
            Role::Other => "other",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One classified step of an agent/tool interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Canonical role.
    pub role: Role,
    /// Best-effort text excerpt, at most [`MAX_EXCERPT_CHARS`] characters.
    pub raw_content: String,
    /// Subtype of a terminal result (`"success"`, `"error_max_turns"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_subtype: Option<String>,
}

impl TraceEvent {
    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, None)
    }

    /// Creates a terminal result event.
    pub fn result(subtype: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::Result, content, Some(subtype.into()))
    }

    /// Creates an event with no recognized role.
    pub fn other(content: impl Into<String>) -> Self {
        Self::new(Role::Other, content, None)
    }

    fn new(role: Role, content: impl Into<String>, terminal_subtype: Option<String>) -> Self {
        let content = content.into();
        Self {
            role,
            raw_content: truncate_chars(&content, MAX_EXCERPT_CHARS).to_string(),
            terminal_subtype,
        }
    }

    /// Returns true for the terminal result event.
    pub fn is_terminal(&self) -> bool {
        self.role == Role::Result
    }

    /// Returns true for a terminal result whose subtype is `"success"`.
    pub fn is_terminal_success(&self) -> bool {
        self.is_terminal() && self.terminal_subtype.as_deref() == Some("success")
    }
}

/// Classifies one raw event. Never fails: unrecognized shapes become [`Role::Other`].
pub fn classify(raw: &Value) -> TraceEvent {
    let role = probe_role(raw);
    let terminal_subtype = match role {
        Role::Result => Some(
            raw.get("subtype")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        _ => None,
    };
    TraceEvent::new(role, excerpt(raw), terminal_subtype)
}

/// Priority-ordered role probe.
fn probe_role(raw: &Value) -> Role {
    let Some(obj) = raw.as_object() else {
        return Role::Other;
    };

    let type_tag = obj.get("type").and_then(Value::as_str);
    let type_name = TYPE_NAME_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str));

    if type_tag == Some(RESULT_TYPE) || type_name == Some(RESULT_TYPE_NAME) {
        return Role::Result;
    }

    // 1. explicit type tag
    if type_tag == Some(ASSISTANT_TYPE) {
        return Role::Assistant;
    }
    // 2. type-name tag
    if type_name == Some(ASSISTANT_TYPE_NAME) {
        return Role::Assistant;
    }
    // 3. role attribute, top-level or on the wrapped message
    let role_attr = obj.get("role").and_then(Value::as_str).or_else(|| {
        obj.get("message")
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
    });
    if role_attr == Some(ASSISTANT_TYPE) {
        return Role::Assistant;
    }

    Role::Other
}

/// Best-effort excerpt: `content`, then `result`, then the whole record.
fn excerpt(raw: &Value) -> String {
    let candidate = raw
        .get("content")
        .or_else(|| raw.get("message").and_then(|m| m.get("content")))
        .or_else(|| raw.get("result"))
        .filter(|v| !v.is_null());

    let text = match candidate {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };
    truncate_chars(&text, MAX_EXCERPT_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_tag_assistant() {
        let event = classify(&json!({"type": "assistant", "message": {"content": "ls -la"}}));
        assert_eq!(event.role, Role::Assistant);
        assert_eq!(event.raw_content, "ls -la");
    }

    #[test]
    fn test_type_name_assistant() {
        let event = classify(&json!({"class": "AssistantMessage", "content": [{"text": "hi"}]}));
        assert_eq!(event.role, Role::Assistant);
        assert_eq!(event.raw_content, r#"[{"text":"hi"}]"#);
    }

    #[test]
    fn test_role_attribute_assistant() {
        assert_eq!(
            classify(&json!({"role": "assistant", "content": "x"})).role,
            Role::Assistant
        );
        assert_eq!(
            classify(&json!({"message": {"role": "assistant", "content": "x"}})).role,
            Role::Assistant
        );
    }

    #[test]
    fn test_user_and_system_are_other() {
        assert_eq!(classify(&json!({"type": "user"})).role, Role::Other);
        assert_eq!(classify(&json!({"type": "system", "subtype": "init"})).role, Role::Other);
        assert_eq!(classify(&json!({"role": "user", "content": "go"})).role, Role::Other);
    }

    #[test]
    fn test_result_event() {
        let event = classify(&json!({
            "type": "result",
            "subtype": "success",
            "result": "Deployed",
            "duration_ms": 1200
        }));
        assert_eq!(event.role, Role::Result);
        assert!(event.is_terminal_success());
        assert_eq!(event.raw_content, "Deployed");
    }

    #[test]
    fn test_result_type_name_without_subtype() {
        let event = classify(&json!({"class": "ResultMessage"}));
        assert!(event.is_terminal());
        assert!(!event.is_terminal_success());
        assert_eq!(event.terminal_subtype.as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_events_fall_back_to_other() {
        for raw in [json!(null), json!(42), json!("stray line"), json!([1, 2])] {
            let event = classify(&raw);
            assert_eq!(event.role, Role::Other);
            assert!(event.terminal_subtype.is_none());
        }
        assert_eq!(classify(&json!("stray line")).raw_content, "stray line");
    }

    #[test]
    fn test_excerpt_falls_back_to_full_record() {
        let event = classify(&json!({"type": "system", "cwd": "/tmp"}));
        assert!(event.raw_content.contains("\"cwd\":\"/tmp\""));
    }

    #[test]
    fn test_excerpt_is_capped() {
        let long = "x".repeat(2000);
        let event = classify(&json!({"type": "assistant", "content": long}));
        assert_eq!(event.raw_content.chars().count(), MAX_EXCERPT_CHARS);
    }
}
