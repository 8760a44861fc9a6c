//! Markdown reports.

use std::fmt::Write;

use super::{percent, summary_lines, total_cost, verdict_source};
use crate::analysis::AnalysisResult;
use crate::runner::{RunResult, SweepOutcome};

fn bullet_section(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n## {}\n", heading);
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

/// Renders one analyzed run as markdown.
pub fn render_run_markdown(run: &RunResult, analysis: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# AgentProbe Results: {} / {}\n", run.tool, run.scenario);
    let _ = writeln!(out, "| Field | Value |");
    let _ = writeln!(out, "|-------|-------|");
    let _ = writeln!(
        out,
        "| Status | {} |",
        if analysis.success { "success" } else { "failed" }
    );
    let _ = writeln!(out, "| Turns | {} |", analysis.total_turns);
    let _ = writeln!(out, "| Duration | {:.1}s |", run.duration_seconds);
    let _ = writeln!(out, "| Cost | ${:.3} |", run.cost_usd);
    let _ = writeln!(out, "| Verdict | {} |", verdict_source(analysis));
    let _ = writeln!(out, "| Run | `{}` |", run.run_id);

    bullet_section(&mut out, "Summary", &summary_lines(analysis));
    bullet_section(&mut out, "Failure reasons", &analysis.failure_reasons);
    bullet_section(&mut out, "Observations", &analysis.observations);
    bullet_section(&mut out, "Recommendations", &analysis.recommendations);
    out
}

/// Renders a sweep and its aggregate as markdown.
pub fn render_sweep_markdown(outcome: &SweepOutcome) -> String {
    let agg = &outcome.aggregate;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# AgentProbe Benchmark: {} / {}\n",
        outcome.tool, outcome.scenario
    );
    let _ = write!(out, "Completed {} of {} runs", outcome.completed(), outcome.requested);
    let _ = writeln!(out, "{}", if outcome.cancelled { " (interrupted)." } else { "." });

    if agg.is_empty() {
        let _ = writeln!(out, "\nNo completed runs to aggregate.");
        return out;
    }

    let _ = writeln!(out, "\n| Metric | Value |");
    let _ = writeln!(out, "|--------|-------|");
    let _ = writeln!(out, "| Success rate | {} |", percent(agg.success_rate));
    let _ = writeln!(out, "| Average turns | {:.1} |", agg.avg_turns);
    let _ = writeln!(out, "| Turn range | {}-{} |", agg.min_turns, agg.max_turns);
    let _ = writeln!(out, "| Total issues | {} |", agg.total_issues);
    let _ = writeln!(out, "| Help usage | {} |", percent(agg.help_usage_rate));
    let _ = writeln!(out, "| Total cost | ${:.3} |", total_cost(outcome));

    let _ = writeln!(out, "\n## Runs\n");
    let _ = writeln!(out, "| # | Success | Turns | Discrepancy | Duration |");
    let _ = writeln!(out, "|---|---------|-------|-------------|----------|");
    for (index, (run, analysis)) in outcome.runs.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {:.1}s |",
            index + 1,
            if analysis.success { "yes" } else { "no" },
            analysis.total_turns,
            if analysis.discrepancy { "yes" } else { "no" },
            run.duration_seconds
        );
    }

    bullet_section(&mut out, "Common observations", &agg.common_observations);
    bullet_section(&mut out, "Common recommendations", &agg.common_recommendations);
    out
}
