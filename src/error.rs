//! Error types for agentprobe operations.
//!
//! Only conditions the caller must act on are errors here:
//! - Scenario lookup and listing
//! - Agent engine availability and launch
//! - Filesystem and serialization faults
//!
//! Malformed trace events, verifier failures and empty aggregate inputs are
//! absorbed where they occur (see [`crate::trace`], [`crate::verifier`] and
//! [`crate::analysis::aggregate`]) and never surface as `Err`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while launching or streaming the agent under test.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Agent engine '{0}' is not available")]
    NotAvailable(String),

    #[error("Failed to launch agent engine '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level errors for scenario runs.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Scenario '{tool}/{scenario}' not found at {}", .path.display())]
    ScenarioUnavailable {
        tool: String,
        scenario: String,
        path: PathBuf,
    },

    #[error("Scenarios directory '{}' is unreadable: {reason}", .path.display())]
    ScenarioDirectory { path: PathBuf, reason: String },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for agentprobe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_unavailable_message() {
        let err = ProbeError::ScenarioUnavailable {
            tool: "gh".to_string(),
            scenario: "pr-create".to_string(),
            path: PathBuf::from("/s/gh/pr-create.txt"),
        };
        let msg = err.to_string();
        assert!(msg.contains("gh/pr-create"));
        assert!(msg.contains("/s/gh/pr-create.txt"));
    }

    #[test]
    fn test_engine_error_converts() {
        let err: ProbeError = EngineError::NotAvailable("claude".to_string()).into();
        assert!(matches!(err, ProbeError::Engine(EngineError::NotAvailable(_))));
    }
}
