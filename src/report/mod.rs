//! Report rendering for runs and sweeps.
//!
//! Every renderer is pure and returns a `String`; printing or writing to a
//! file is the caller's job.

mod markdown;
mod text;

use serde::Serialize;

use crate::analysis::{AggregateResult, AnalysisResult, Provenance};
use crate::runner::{RunResult, SweepOutcome};
use crate::trace::Trace;

pub use markdown::{render_run_markdown, render_sweep_markdown};
pub use text::{render_run_text, render_sweep_text, render_trace};

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(format!("Unknown report format: {}", other)),
        }
    }
}

/// JSON shape of a single-run report.
#[derive(Serialize)]
struct RunReport<'a> {
    run_id: &'a str,
    tool: &'a str,
    scenario: &'a str,
    started_at: String,
    duration_seconds: f64,
    cost_usd: f64,
    /// Success as the terminal event reported it.
    reported_success: bool,
    analysis: &'a AnalysisResult,
    trace: &'a Trace,
}

/// JSON shape of one run inside a sweep report.
#[derive(Serialize)]
struct SweepRunLine<'a> {
    run_id: &'a str,
    success: bool,
    total_turns: usize,
    discrepancy: bool,
    duration_seconds: f64,
    cost_usd: f64,
}

/// JSON shape of a sweep report.
#[derive(Serialize)]
struct SweepReport<'a> {
    tool: &'a str,
    scenario: &'a str,
    requested: usize,
    completed: usize,
    cancelled: bool,
    total_cost_usd: f64,
    aggregate: &'a AggregateResult,
    runs: Vec<SweepRunLine<'a>>,
}

/// Renders one analyzed run.
pub fn render_run(
    run: &RunResult,
    analysis: &AnalysisResult,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_run_text(run, analysis)),
        ReportFormat::Markdown => Ok(render_run_markdown(run, analysis)),
        ReportFormat::Json => serde_json::to_string_pretty(&RunReport {
            run_id: &run.run_id,
            tool: &run.tool,
            scenario: &run.scenario,
            started_at: run.started_at.to_rfc3339(),
            duration_seconds: run.duration_seconds,
            cost_usd: run.cost_usd,
            reported_success: run.success,
            analysis,
            trace: &run.trace,
        }),
    }
}

/// Renders a sweep with its aggregate.
pub fn render_sweep(outcome: &SweepOutcome, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_sweep_text(outcome)),
        ReportFormat::Markdown => Ok(render_sweep_markdown(outcome)),
        ReportFormat::Json => serde_json::to_string_pretty(&SweepReport {
            tool: &outcome.tool,
            scenario: &outcome.scenario,
            requested: outcome.requested,
            completed: outcome.completed(),
            cancelled: outcome.cancelled,
            total_cost_usd: total_cost(outcome),
            aggregate: &outcome.aggregate,
            runs: outcome
                .runs
                .iter()
                .map(|(run, analysis)| SweepRunLine {
                    run_id: &run.run_id,
                    success: analysis.success,
                    total_turns: analysis.total_turns,
                    discrepancy: analysis.discrepancy,
                    duration_seconds: run.duration_seconds,
                    cost_usd: run.cost_usd,
                })
                .collect(),
        }),
    }
}

fn total_cost(outcome: &SweepOutcome) -> f64 {
    outcome.runs.iter().map(|(run, _)| run.cost_usd).sum()
}

/// Short summary bullets shared by the text and markdown renderers.
fn summary_lines(analysis: &AnalysisResult) -> Vec<String> {
    let mut lines = Vec::new();
    if analysis.success {
        lines.push("Task completed successfully".to_string());
    } else {
        lines.push("Task failed to complete".to_string());
    }
    lines.push(format!("Required {} turns to complete", analysis.total_turns));
    if !analysis.errors_encountered.is_empty() {
        lines.push(format!(
            "Encountered {} errors",
            analysis.errors_encountered.len()
        ));
    }
    if analysis.discrepancy {
        lines.push("Verifier contradicted the agent's reported outcome".to_string());
    }
    lines
}

/// One-line description of who decided the verdict.
fn verdict_source(analysis: &AnalysisResult) -> String {
    match (analysis.provenance, analysis.verifier_tier) {
        (Provenance::Verifier { tier }, _) => format!("verifier override, tier {}", tier),
        (Provenance::Heuristic, Some(tier)) if tier.is_degraded() => {
            format!("heuristic, verifier tier {} (low confidence)", tier)
        }
        (Provenance::Heuristic, Some(tier)) => format!("heuristic, verifier tier {}", tier),
        (Provenance::Heuristic, None) => "heuristic only".to_string(),
    }
}

fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}
