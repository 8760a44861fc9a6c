//! Panel-style plain text reports for the terminal.

use std::fmt::Write;

use super::{percent, summary_lines, total_cost, verdict_source};
use crate::analysis::AnalysisResult;
use crate::runner::{RunResult, SweepOutcome};
use crate::trace::Trace;
use crate::utils::truncate_with_ellipsis;

const PANEL_WIDTH: usize = 72;
const TRACE_LINE_CHARS: usize = 160;

/// Collects lines and frames them in a titled box.
struct Panel {
    title: String,
    lines: Vec<String>,
}

impl Panel {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn section(&mut self, heading: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        self.blank();
        self.line(format!("{}:", heading));
        for item in items {
            self.line(format!("• {}", item));
        }
    }

    fn render(&self) -> String {
        let header = format!("╭─ {} ", self.title);
        let pad = PANEL_WIDTH.saturating_sub(header.chars().count());
        let mut out = String::new();
        let _ = writeln!(out, "{}{}", header, "─".repeat(pad));
        for line in &self.lines {
            if line.is_empty() {
                let _ = writeln!(out, "│");
            } else {
                let _ = writeln!(out, "│ {}", line);
            }
        }
        let _ = write!(out, "╰{}", "─".repeat(PANEL_WIDTH - 1));
        out
    }
}

fn status_label(success: bool) -> &'static str {
    if success {
        "✓ SUCCESS"
    } else {
        "❌ FAILED"
    }
}

/// Renders one analyzed run as a panel.
pub fn render_run_text(run: &RunResult, analysis: &AnalysisResult) -> String {
    let mut panel = Panel::new("AgentProbe Results");
    panel.line(format!("Tool: {} | Scenario: {}", run.tool, run.scenario));
    panel.line(format!(
        "Status: {} | Duration: {:.1}s | Cost: ${:.3}",
        status_label(analysis.success),
        run.duration_seconds,
        run.cost_usd
    ));
    panel.line(format!("Verdict: {}", verdict_source(analysis)));

    panel.blank();
    panel.line("Summary:");
    for line in summary_lines(analysis) {
        panel.line(format!("• {}", line));
    }

    panel.section("Observations", &analysis.observations);
    panel.section("Recommendations", &analysis.recommendations);
    panel.render()
}

/// Renders a benchmark sweep and its aggregate as a panel.
pub fn render_sweep_text(outcome: &SweepOutcome) -> String {
    let agg = &outcome.aggregate;
    let mut panel = Panel::new("AgentProbe Benchmark");
    panel.line(format!("Tool: {} | Scenario: {}", outcome.tool, outcome.scenario));

    let mut runs = format!("Runs: {}/{}", outcome.completed(), outcome.requested);
    if outcome.cancelled {
        runs.push_str(" (interrupted)");
    }
    panel.line(runs);

    if agg.is_empty() {
        panel.blank();
        panel.line("No completed runs to aggregate.");
        return panel.render();
    }

    panel.line(format!(
        "Success rate: {} | Help usage: {} | Total cost: ${:.3}",
        percent(agg.success_rate),
        percent(agg.help_usage_rate),
        total_cost(outcome)
    ));
    panel.line(format!(
        "Turns: avg {:.1}, min {}, max {} | Issues: {}",
        agg.avg_turns, agg.min_turns, agg.max_turns, agg.total_issues
    ));

    panel.blank();
    panel.line("Per run:");
    for (index, (run, analysis)) in outcome.runs.iter().enumerate() {
        let mut line = format!(
            "{:>2}. {} in {} turns, {:.1}s",
            index + 1,
            status_label(analysis.success),
            analysis.total_turns,
            run.duration_seconds
        );
        if analysis.discrepancy {
            line.push_str(" [discrepancy]");
        }
        if analysis.is_low_confidence() {
            line.push_str(" [low confidence]");
        }
        panel.line(line);
    }

    panel.section("Common observations", &agg.common_observations);
    panel.section("Common recommendations", &agg.common_recommendations);
    panel.render()
}

/// Renders a trace one event per line, for verbose output.
pub fn render_trace(trace: &Trace) -> String {
    let mut out = String::new();
    for (index, event) in trace.iter().enumerate() {
        let content = event.raw_content.split_whitespace().collect::<Vec<_>>().join(" ");
        let _ = writeln!(
            out,
            "{:>3}. [{}] {}",
            index + 1,
            event.role,
            truncate_with_ellipsis(&content, TRACE_LINE_CHARS)
        );
    }
    out
}
