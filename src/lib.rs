//! agentprobe: usability probing of CLI tools through AI agents.
//!
//! This library runs an agent through a scenario, normalizes its event
//! stream into a [`trace::Trace`], and decides whether the run really
//! succeeded: an offline heuristic first, then a secondary verifier in an
//! isolated process, then a merge. Repeated runs reduce to an aggregate.

// Core modules
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod trace;
pub mod utils;
pub mod verifier;

pub use analysis::{aggregate, analyze_trace, merge, AggregateResult, AnalysisResult};
pub use config::Credential;
pub use error::{EngineError, ProbeError};
pub use runner::{RunConfig, RunResult, ScenarioRunner, SweepOutcome};
pub use trace::{Trace, TraceEvent};
pub use verifier::{VerificationRequest, Verifier, VerifierVerdict};
