//! Results of scenario runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{AggregateResult, AnalysisResult};
use crate::trace::{classify, Trace};

/// Complete result of running the agent against one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Unique identifier for this run.
    pub run_id: String,
    /// Tool under test.
    pub tool: String,
    /// Scenario name.
    pub scenario: String,
    /// Scenario text the agent was given.
    pub scenario_text: String,
    /// Normalized trace.
    pub trace: Trace,
    /// Events exactly as the engine emitted them.
    pub raw_events: Vec<Value>,
    /// Whether the terminal event reported success.
    pub success: bool,
    /// Run duration reported by the agent, zero when absent.
    pub duration_seconds: f64,
    /// Cost reported by the agent, zero when absent.
    pub cost_usd: f64,
    /// Timestamp when the run started.
    pub started_at: DateTime<Utc>,
}

impl RunResult {
    /// Builds a result from raw events.
    ///
    /// Duration and cost come from the terminal event's `duration_ms` and
    /// `total_cost_usd`, each zero when absent.
    pub fn from_events(
        run_id: impl Into<String>,
        tool: impl Into<String>,
        scenario: impl Into<String>,
        scenario_text: impl Into<String>,
        raw_events: Vec<Value>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let trace = Trace::from_raw(&raw_events);
        let success = trace.terminal().is_some_and(|t| t.is_terminal_success());
        let terminal_raw = raw_events.iter().find(|event| classify(event).is_terminal());

        let duration_seconds = terminal_raw
            .and_then(|event| event.get("duration_ms"))
            .and_then(Value::as_f64)
            .map(|ms| ms / 1000.0)
            .unwrap_or(0.0);
        let cost_usd = terminal_raw
            .and_then(|event| event.get("total_cost_usd"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Self {
            run_id: run_id.into(),
            tool: tool.into(),
            scenario: scenario.into(),
            scenario_text: scenario_text.into(),
            trace,
            raw_events,
            success,
            duration_seconds,
            cost_usd,
            started_at,
        }
    }

    /// Whether the verifier has any scenario context to work with.
    pub fn has_scenario_text(&self) -> bool {
        !self.scenario_text.trim().is_empty()
    }
}

/// Outcome of a benchmark sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub tool: String,
    pub scenario: String,
    /// Runs requested by the caller.
    pub requested: usize,
    /// Completed runs with their analyses, in run order.
    pub runs: Vec<(RunResult, AnalysisResult)>,
    pub aggregate: AggregateResult,
    /// Set when the sweep was interrupted before all runs completed.
    pub cancelled: bool,
}

impl SweepOutcome {
    pub fn completed(&self) -> usize {
        self.runs.len()
    }
}

impl std::fmt::Display for SweepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}: {}/{} runs",
            self.tool,
            self.scenario,
            self.completed(),
            self.requested
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
