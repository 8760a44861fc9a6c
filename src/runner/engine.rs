//! Agent engines that execute a scenario and stream back raw events.
//!
//! An engine turns a prompt into a stream of JSON events, one per agent
//! message. The stream ends when the agent process exits. Lines that are
//! not JSON are kept as `{"type": "raw", "content": <line>}` so nothing the
//! agent printed is lost to the trace.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::Credential;
use crate::error::EngineError;

/// Stream of raw agent events.
pub type EventStream = BoxStream<'static, Value>;

/// One scenario execution request handed to an engine.
#[derive(Debug, Clone)]
pub struct ScenarioRequest {
    /// Prompt the agent sees (the scenario text).
    pub prompt: String,
    /// Working directory for the agent.
    pub work_dir: Option<PathBuf>,
    /// Turn budget.
    pub max_turns: u32,
}

/// Trait for agent engines.
#[async_trait]
pub trait AgentEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Starts the agent and returns its event stream.
    async fn execute(&self, request: &ScenarioRequest) -> Result<EventStream, EngineError>;

    /// Checks if this engine is available on the system.
    async fn is_available(&self) -> bool;
}

/// Runs the `claude` CLI in streaming JSON mode.
pub struct ClaudeCliEngine {
    program: String,
    model: Option<String>,
    credential: Option<Credential>,
}

impl ClaudeCliEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            model: None,
            credential: None,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Sets the credential injected into the agent process.
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    fn command(&self, request: &ScenarioRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-p")
            .arg(&request.prompt)
            .args(["--output-format", "stream-json", "--verbose"])
            .arg("--max-turns")
            .arg(request.max_turns.to_string());
        if let Some(ref model) = self.model {
            cmd.arg("--model").arg(model);
        }
        if let Some(ref dir) = request.work_dir {
            cmd.current_dir(dir);
        }
        if let Some(ref credential) = self.credential {
            credential.apply(&mut cmd);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

/// Parses one line of agent output into an event.
pub fn parse_event_line(line: &str) -> Value {
    match serde_json::from_str::<Value>(line) {
        Ok(value @ Value::Object(_)) => value,
        _ => json!({ "type": "raw", "content": line }),
    }
}

#[async_trait]
impl AgentEngine for ClaudeCliEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn execute(&self, request: &ScenarioRequest) -> Result<EventStream, EngineError> {
        let mut child = self.command(request).spawn().map_err(|e| EngineError::Spawn {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;
        info!(
            program = %self.program,
            max_turns = request.max_turns,
            "Agent process started"
        );

        let stdout = child.stdout.take().ok_or_else(|| EngineError::Spawn {
            program: self.program.clone(),
            reason: "stdout was not captured".to_string(),
        })?;
        let mut lines = BufReader::new(stdout).lines();

        let stream = async_stream::stream! {
            // Owned here so dropping the stream kills the agent.
            let mut child = child;
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        yield parse_event_line(line);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Failed to read agent output");
                        break;
                    }
                }
            }
            match child.wait().await {
                Ok(status) => debug!(exit_code = ?status.code(), "Agent process exited"),
                Err(e) => warn!(error = %e, "Failed to reap agent process"),
            }
        };
        Ok(Box::pin(stream))
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_parse_event_line() {
        let event = parse_event_line(r#"{"type":"assistant","content":"hi"}"#);
        assert_eq!(event["type"], "assistant");

        let raw = parse_event_line("not json at all");
        assert_eq!(raw["type"], "raw");
        assert_eq!(raw["content"], "not json at all");

        // Valid JSON that is not an object is still a raw line.
        assert_eq!(parse_event_line("42")["type"], "raw");
    }

    #[test]
    fn test_command_arguments() {
        let engine = ClaudeCliEngine::new("claude").with_model(Some("sonnet".to_string()));
        let request = ScenarioRequest {
            prompt: "List repos".to_string(),
            work_dir: None,
            max_turns: 7,
        };
        let cmd = engine.command(&request);
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "-p",
                "List repos",
                "--output-format",
                "stream-json",
                "--verbose",
                "--max-turns",
                "7",
                "--model",
                "sonnet"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let engine = ClaudeCliEngine::new("/nonexistent/agentprobe-agent");
        let request = ScenarioRequest {
            prompt: "x".to_string(),
            work_dir: None,
            max_turns: 1,
        };
        assert!(matches!(
            engine.execute(&request).await,
            Err(EngineError::Spawn { .. })
        ));
        assert!(!engine.is_available().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_streams_lines_from_process() {
        // `sh -p <file>` runs the prompt as a script, standing in for the agent.
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-agent.sh");
        std::fs::write(
            &script,
            "echo '{\"type\":\"assistant\",\"content\":\"running ls\"}'\n\
             echo 'plain text'\n\
             echo ''\n\
             echo '{\"type\":\"result\",\"subtype\":\"success\",\"result\":\"ok\"}'\n",
        )
        .unwrap();

        let engine = ClaudeCliEngine::new("sh");
        let request = ScenarioRequest {
            prompt: script.to_string_lossy().to_string(),
            work_dir: Some(dir.path().to_path_buf()),
            max_turns: 3,
        };
        let events: Vec<Value> = engine.execute(&request).await.unwrap().collect().await;
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["type"], "assistant");
        assert_eq!(events[1]["type"], "raw");
        assert_eq!(events[2]["subtype"], "success");
    }
}
