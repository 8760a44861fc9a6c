//! Configuration for the isolated verifier worker.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Credential;

/// Default reasoning-engine CLI.
pub const DEFAULT_VERIFIER_PROGRAM: &str = "claude";
/// Default wall-clock budget for one verification.
pub const DEFAULT_VERIFIER_TIMEOUT: Duration = Duration::from_secs(120);

/// How to launch the reasoning engine for one verification.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Executable to launch.
    pub program: String,
    /// Arguments; the prompt is supplied on stdin.
    pub args: Vec<String>,
    /// Hard wall-clock timeout.
    pub timeout: Duration,
    /// Model passed as `--model`, if any.
    pub model: Option<String>,
    /// Credential injected into the child environment.
    pub credential: Option<Credential>,
    /// Working directory for the child.
    pub working_dir: Option<PathBuf>,
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_VERIFIER_PROGRAM.to_string(),
            args: vec![
                "-p".to_string(),
                "--output-format".to_string(),
                "text".to_string(),
                "--max-turns".to_string(),
                "1".to_string(),
            ],
            timeout: DEFAULT_VERIFIER_TIMEOUT,
            model: None,
            credential: None,
            working_dir: None,
        }
    }

    /// Sets the executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Replaces the argument list.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the credential for the child process.
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Sets the working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::new()
    }
}
