//! Isolated worker invocation of the reasoning engine.
//!
//! The engine runs as its own child process, never inside the caller's
//! runtime. One prompt in, one reply out, bounded by a wall clock. The prompt
//! travels through a scratch file that is removed on every exit path.

use std::fs::File;
use std::io::Write;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::VerifierConfig;
use super::verdict::VerifierFailure;

/// Characters of stderr kept in process-failure messages.
const STDERR_EXCERPT_CHARS: usize = 300;

/// A prompt-in / text-out reasoning engine.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Returns the engine's raw reply to `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, VerifierFailure>;
}

/// Runs the engine CLI as a separate process per call.
pub struct IsolatedWorker {
    config: VerifierConfig,
}

impl IsolatedWorker {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    fn command(&self, stdin: File) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args);
        if let Some(ref model) = self.config.model {
            cmd.arg("--model").arg(model);
        }
        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }
        if let Some(ref credential) = self.config.credential {
            credential.apply(&mut cmd);
        }
        cmd.stdin(Stdio::from(stdin))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ReasoningEngine for IsolatedWorker {
    async fn complete(&self, prompt: &str) -> Result<String, VerifierFailure> {
        // Removed when dropped, whichever way this function returns.
        let mut scratch = tempfile::Builder::new()
            .prefix("agentprobe-verify-")
            .suffix(".txt")
            .tempfile()?;
        scratch.write_all(prompt.as_bytes())?;
        scratch.flush()?;
        let stdin = File::open(scratch.path())?;

        let mut cmd = self.command(stdin);
        let start = Instant::now();
        info!(
            program = %self.config.program,
            timeout_secs = self.config.timeout.as_secs(),
            "Launching isolated verifier"
        );

        let child = cmd.spawn().map_err(|e| {
            VerifierFailure::Process(format!("failed to spawn {}: {}", self.config.program, e))
        })?;

        // Dropping the future on timeout drops the child, and kill_on_drop kills it.
        let output = match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "Verifier exceeded wall-clock budget; process killed"
                );
                return Err(VerifierFailure::Timeout(self.config.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            exit_code = ?output.status.code(),
            stdout_len = stdout.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Verifier process finished"
        );

        if !output.status.success() && stdout.is_empty() {
            return Err(VerifierFailure::Process(format!(
                "exit code {:?}: {}",
                output.status.code(),
                crate::utils::truncate_chars(stderr.trim(), STDERR_EXCERPT_CHARS)
            )));
        }
        if stdout.is_empty() {
            return Err(VerifierFailure::Parse("empty reply".to_string()));
        }
        Ok(stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    #[cfg(target_os = "linux")]
    use std::path::PathBuf;
    use std::time::Duration;

    fn sh(script: &str) -> VerifierConfig {
        VerifierConfig::new()
            .with_program("sh")
            .with_args(vec!["-c".to_string(), script.to_string()])
            .with_timeout(Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_prompt_reaches_child_via_stdin() {
        let worker = IsolatedWorker::new(sh("cat"));
        let reply = worker.complete("hello verifier").await.unwrap();
        assert_eq!(reply, "hello verifier");
    }

    /// Runs `tail` in a child that first records the path of its stdin in a side file,
    /// then returns the scratch path that was recorded.
    #[cfg(target_os = "linux")]
    async fn scratch_path_after(tail: &str, timeout: Duration) -> (Result<String, VerifierFailure>, PathBuf) {
        let side = tempfile::tempdir().unwrap();
        let record = side.path().join("stdin-path");
        let script = format!("readlink /proc/self/fd/0 > '{}'; {}", record.display(), tail);
        let worker = IsolatedWorker::new(sh(&script).with_timeout(timeout));
        let result = worker.complete("scratch prompt").await;
        let recorded = std::fs::read_to_string(&record).unwrap();
        (result, PathBuf::from(recorded.trim()))
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_scratch_file_removed_after_success() {
        let (result, scratch) = scratch_path_after("cat", Duration::from_secs(10)).await;
        assert_eq!(result.unwrap(), "scratch prompt");
        assert!(scratch.is_absolute());
        assert!(!scratch.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_scratch_file_removed_after_timeout() {
        let (result, scratch) = scratch_path_after("sleep 30", Duration::from_millis(500)).await;
        assert!(matches!(result, Err(VerifierFailure::Timeout(_))));
        assert!(scratch.is_absolute());
        assert!(!scratch.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_scratch_file_removed_after_failing_exit() {
        let (result, scratch) = scratch_path_after("exit 3", Duration::from_secs(10)).await;
        assert!(matches!(result, Err(VerifierFailure::Process(_))));
        assert!(scratch.is_absolute());
        assert!(!scratch.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_scratch_file_removed_after_empty_reply() {
        let (result, scratch) = scratch_path_after("true", Duration::from_secs(10)).await;
        assert!(matches!(result, Err(VerifierFailure::Parse(_))));
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let worker =
            IsolatedWorker::new(sh("sleep 30").with_timeout(Duration::from_millis(200)));
        let start = Instant::now();
        let err = worker.complete("x").await.unwrap_err();
        assert!(matches!(err, VerifierFailure::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_missing_program_is_process_failure() {
        let config = VerifierConfig::new().with_program("/nonexistent/agentprobe-engine");
        let err = IsolatedWorker::new(config).complete("x").await.unwrap_err();
        assert!(matches!(err, VerifierFailure::Process(_)));
    }

    #[tokio::test]
    async fn test_failing_exit_without_output() {
        let worker = IsolatedWorker::new(sh("echo boom >&2; exit 3"));
        match worker.complete("x").await.unwrap_err() {
            VerifierFailure::Process(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_reply_is_parse_failure() {
        let worker = IsolatedWorker::new(sh("true"));
        let err = worker.complete("x").await.unwrap_err();
        assert!(matches!(err, VerifierFailure::Parse(_)));
    }
}
