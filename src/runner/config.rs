//! Configuration for scenario runs.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Credential;
use crate::verifier::VerifierConfig;

/// Default directory holding `<tool>/<scenario>.txt` files.
pub const DEFAULT_SCENARIOS_DIR: &str = "scenarios";
/// Default turn budget handed to the agent.
pub const DEFAULT_MAX_TURNS: u32 = 20;
/// Default agent CLI.
pub const DEFAULT_ENGINE_PROGRAM: &str = "claude";

/// Configuration for running the agent against scenarios.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root of the scenario tree.
    pub scenarios_dir: PathBuf,
    /// Working directory for the agent process.
    pub work_dir: Option<PathBuf>,
    /// Maximum agent turns per run.
    pub max_turns: u32,
    /// Wall-clock budget for one agent run.
    pub timeout: Duration,
    /// Agent CLI executable.
    pub engine_program: String,
    /// Model for the agent (if applicable).
    pub model: Option<String>,
    /// OAuth credential handed to every child process.
    pub credential: Option<Credential>,
    /// Whether runs with scenario text are passed to the verifier.
    pub verify: bool,
    /// Verifier launch settings.
    pub verifier: VerifierConfig,
}

impl RunConfig {
    /// Creates a run configuration with defaults.
    pub fn new(scenarios_dir: impl Into<PathBuf>) -> Self {
        Self {
            scenarios_dir: scenarios_dir.into(),
            work_dir: None,
            max_turns: DEFAULT_MAX_TURNS,
            timeout: Duration::from_secs(1800), // 30 minutes default
            engine_program: DEFAULT_ENGINE_PROGRAM.to_string(),
            model: None,
            credential: None,
            verify: true,
            verifier: VerifierConfig::default(),
        }
    }

    /// Sets the agent working directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Sets the turn budget.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Sets the run timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the agent executable.
    pub fn with_engine_program(mut self, program: impl Into<String>) -> Self {
        self.engine_program = program.into();
        self
    }

    /// Sets the model for the agent.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the credential for the agent and the verifier.
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.verifier = self.verifier.with_credential(credential.clone());
        self.credential = credential;
        self
    }

    /// Enables or disables the secondary verifier.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Replaces the verifier settings, keeping the shared credential.
    pub fn with_verifier(mut self, verifier: VerifierConfig) -> Self {
        self.verifier = if verifier.credential.is_none() {
            verifier.with_credential(self.credential.clone())
        } else {
            verifier
        };
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCENARIOS_DIR)
    }
}
