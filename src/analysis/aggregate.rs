//! Cross-run aggregation for a benchmark sweep.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::AnalysisResult;

/// Fraction of runs an item must appear in to count as common.
pub const COMMON_PATTERN_FRACTION: f64 = 0.2;

/// Summary statistics over repeated runs of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_runs: usize,
    pub success_rate: f64,
    pub avg_turns: f64,
    pub min_turns: usize,
    pub max_turns: usize,
    pub total_issues: usize,
    pub help_usage_rate: f64,
    pub common_observations: Vec<String>,
    pub common_recommendations: Vec<String>,
}

impl AggregateResult {
    /// Sentinel for an empty sweep.
    pub fn empty() -> Self {
        Self {
            total_runs: 0,
            success_rate: 0.0,
            avg_turns: 0.0,
            min_turns: 0,
            max_turns: 0,
            total_issues: 0,
            help_usage_rate: 0.0,
            common_observations: Vec::new(),
            common_recommendations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_runs == 0
    }
}

/// Minimum occurrence count for an item to be common across `total_runs`.
pub fn common_threshold(total_runs: usize) -> usize {
    let raw = (total_runs as f64 * COMMON_PATTERN_FRACTION).ceil() as usize;
    raw.max(1)
}

/// Reduces per-run results into an [`AggregateResult`]. Pure.
pub fn aggregate(results: &[AnalysisResult]) -> AggregateResult {
    if results.is_empty() {
        return AggregateResult::empty();
    }

    let total_runs = results.len();
    let runs = total_runs as f64;

    let successes = results.iter().filter(|r| r.success).count();
    let turns: Vec<usize> = results.iter().map(|r| r.total_turns).collect();
    let help_runs = results.iter().filter(|r| r.help_used == Some(true)).count();
    let threshold = common_threshold(total_runs);

    AggregateResult {
        total_runs,
        success_rate: successes as f64 / runs,
        avg_turns: turns.iter().sum::<usize>() as f64 / runs,
        min_turns: turns.iter().copied().min().unwrap_or(0),
        max_turns: turns.iter().copied().max().unwrap_or(0),
        total_issues: results.iter().map(AnalysisResult::issue_count).sum(),
        help_usage_rate: help_runs as f64 / runs,
        common_observations: common_items(
            results.iter().flat_map(|r| r.observations.iter()),
            threshold,
        ),
        common_recommendations: common_items(
            results.iter().flat_map(|r| r.recommendations.iter()),
            threshold,
        ),
    }
}

/// Items occurring at least `threshold` times, by descending count then first appearance.
fn common_items<'a>(items: impl Iterator<Item = &'a String>, threshold: usize) -> Vec<String> {
    // (count, first-seen index)
    let mut counts: HashMap<&'a str, (usize, usize)> = HashMap::new();
    for (index, item) in items.enumerate() {
        counts.entry(item.as_str()).or_insert((0, index)).0 += 1;
    }

    let mut common: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .filter(|(_, (count, _))| *count >= threshold)
        .map(|(item, (count, first))| (item, count, first))
        .collect();
    common.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    common.into_iter().map(|(item, _, _)| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Provenance;
    use crate::analysis::{analyze_trace, merge};
    use crate::trace::Trace;
    use serde_json::json;

    fn run(turns: usize, success: bool) -> AnalysisResult {
        AnalysisResult {
            total_turns: turns,
            success,
            discrepancy: false,
            observations: Vec::new(),
            recommendations: Vec::new(),
            evidence_summary: String::new(),
            provenance: Provenance::Heuristic,
            failure_reasons: Vec::new(),
            help_used: None,
            heuristic_help_used: false,
            errors_encountered: Vec::new(),
            verifier_tier: None,
        }
    }

    #[test]
    fn test_basic_arithmetic() {
        let results = vec![run(3, true), run(5, true), run(7, false)];
        let agg = aggregate(&results);
        assert_eq!(agg.total_runs, 3);
        assert!((agg.avg_turns - 5.0).abs() < f64::EPSILON);
        assert_eq!(agg.min_turns, 3);
        assert_eq!(agg.max_turns, 7);
        assert!((agg.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((agg.success_rate - 0.667).abs() < 1e-3);
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate(&[]);
        assert!(agg.is_empty());
        assert_eq!(agg, AggregateResult::empty());
    }

    #[test]
    fn test_threshold() {
        assert_eq!(common_threshold(1), 1);
        assert_eq!(common_threshold(3), 1);
        assert_eq!(common_threshold(5), 1);
        assert_eq!(common_threshold(6), 2);
        assert_eq!(common_threshold(10), 2);
    }

    #[test]
    fn test_common_pattern_frequency_gate() {
        let mut results: Vec<AnalysisResult> = (0..10).map(|_| run(1, true)).collect();
        results[0].observations.push("seen twice".to_string());
        results[7].observations.push("seen twice".to_string());
        results[3].observations.push("seen once".to_string());

        let agg = aggregate(&results);
        assert!(agg.common_observations.contains(&"seen twice".to_string()));
        assert!(!agg.common_observations.contains(&"seen once".to_string()));
    }

    #[test]
    fn test_single_run_surfaces_everything() {
        let mut single = run(4, false);
        single.observations = vec!["a".to_string(), "b".to_string()];
        single.recommendations = vec!["r".to_string()];
        let agg = aggregate(&[single]);
        assert_eq!(agg.success_rate, 0.0);
        assert_eq!(agg.common_observations, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(agg.common_recommendations, vec!["r".to_string()]);

        let agg = aggregate(&[run(2, true)]);
        assert_eq!(agg.success_rate, 1.0);
    }

    #[test]
    fn test_ordering_by_count_then_first_seen() {
        let mut a = run(1, true);
        a.observations = vec!["late".into(), "early".into()];
        let mut b = run(1, true);
        b.observations = vec!["frequent".into(), "frequent".into(), "early".into()];
        let agg = aggregate(&[a, b]);
        assert_eq!(
            agg.common_observations,
            vec![
                "early".to_string(),
                "frequent".to_string(),
                "late".to_string()
            ]
        );
    }

    #[test]
    fn test_issue_and_help_rates() {
        let mut a = run(1, false);
        a.failure_reasons = vec!["x".into(), "y".into()];
        a.help_used = Some(true);
        let mut b = run(1, true);
        b.failure_reasons = vec!["z".into()];
        b.help_used = Some(false);
        let c = run(1, true);
        let agg = aggregate(&[a, b, c]);
        assert_eq!(agg.total_issues, 3);
        assert!((agg.help_usage_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_heuristic_help_detection_does_not_count_toward_rate() {
        let raw = vec![
            json!({"type": "assistant", "content": "gh --help"}),
            json!({"type": "result", "subtype": "success", "result": "done"}),
        ];
        let trace = Trace::from_raw(&raw);
        let results: Vec<AnalysisResult> =
            (0..3).map(|_| merge(analyze_trace(&trace), None)).collect();
        assert!(results.iter().all(|r| r.heuristic_help_used));

        let agg = aggregate(&results);
        assert_eq!(agg.help_usage_rate, 0.0);
        assert_eq!(agg.success_rate, 1.0);
    }
}
