//! Scenario runner for CLI usability probing.
//!
//! This module drives an AI agent through a scenario and captures its
//! event stream for analysis.
//!
//! # Architecture
//!
//! ```text
//! scenarios/<tool>/<name>.txt → ScenarioRunner → AgentEngine → raw events
//!                                      │
//!                                      └─→ Trace → analysis (heuristic → verifier → merge)
//! ```
//!
//! The runner:
//! 1. Loads the scenario text (what the agent sees)
//! 2. Streams the agent's events through the engine
//! 3. Records duration and cost from the terminal event
//! 4. Analyzes the trace, optionally sweeping many runs into an aggregate
//!
//! # Example
//!
//! ```ignore
//! use agentprobe::runner::{RunConfig, ScenarioRunner};
//!
//! let config = RunConfig::new("./scenarios").with_max_turns(20);
//! let runner = ScenarioRunner::new(config);
//!
//! let (run, analysis) = runner.run_and_analyze("gh", "create-pr").await?;
//! println!("{} turns, success: {}", analysis.total_turns, analysis.success);
//!
//! let sweep = runner.sweep("gh", "create-pr", 5).await?;
//! println!("Success rate: {:.0}%", sweep.aggregate.success_rate * 100.0);
//! ```

pub mod config;
pub mod engine;
pub mod executor;
pub mod result;
pub mod scenario;

pub use config::{RunConfig, DEFAULT_MAX_TURNS, DEFAULT_SCENARIOS_DIR};
pub use engine::{parse_event_line, AgentEngine, ClaudeCliEngine, EventStream, ScenarioRequest};
pub use executor::ScenarioRunner;
pub use result::{RunResult, SweepOutcome};
pub use scenario::{list_scenarios, list_tool_scenarios, load_scenario, ScenarioRef};
