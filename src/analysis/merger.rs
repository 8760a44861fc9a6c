//! Reconciliation of heuristic and verifier verdicts.
//!
//! The verifier is authoritative when it reports a discrepancy with a known
//! verdict that differs from the heuristic. An undecided verifier never
//! changes `success`.

use tracing::debug;

use crate::utils::truncate_with_ellipsis;
use crate::verifier::{VerdictTier, VerifierVerdict};

use super::types::{AnalysisResult, HeuristicResult, Provenance};

/// Characters of verifier narrative kept as an observation.
const ANALYSIS_OBSERVATION_CHARS: usize = 300;

/// Merges a heuristic result with an optional verifier verdict.
pub fn merge(heuristic: HeuristicResult, verdict: Option<&VerifierVerdict>) -> AnalysisResult {
    let heuristic_success = heuristic.success;
    let mut result = AnalysisResult::from(heuristic);

    let Some(verdict) = verdict else {
        return result;
    };

    result.verifier_tier = Some(verdict.tier);

    if verdict.discrepancy {
        match verdict.actual_success {
            Some(actual) if actual != heuristic_success => {
                debug!(
                    heuristic = heuristic_success,
                    verifier = actual,
                    tier = %verdict.tier,
                    "Verifier overrides heuristic verdict"
                );
                result.success = actual;
                result.discrepancy = true;
                result.provenance = Provenance::Verifier { tier: verdict.tier };
                result.observations.push(format!(
                    "Discrepancy: agent outcome looked like {} but verifier judged {}",
                    outcome_label(heuristic_success),
                    outcome_label(actual)
                ));
            }
            Some(actual) => {
                result.observations.push(format!(
                    "Verifier flagged a discrepancy but its verdict ({}) matches the agent outcome; \
                     heuristic verdict kept",
                    outcome_label(actual)
                ));
            }
            None => {
                result.observations.push(
                    "Verifier reported a discrepancy but could not determine actual success; \
                     heuristic verdict kept"
                        .to_string(),
                );
            }
        }
    }

    for reason in &verdict.failure_reasons {
        result.observations.push(format!("Failure: {}", reason));
    }
    result.failure_reasons.extend(verdict.failure_reasons.iter().cloned());

    let analysis = verdict.analysis.trim();
    if !analysis.is_empty() {
        result.observations.push(format!(
            "Verifier analysis: {}",
            truncate_with_ellipsis(analysis, ANALYSIS_OBSERVATION_CHARS)
        ));
        result.evidence_summary = truncate_with_ellipsis(analysis, ANALYSIS_OBSERVATION_CHARS);
    }

    result
        .recommendations
        .extend(verdict.recommendations.iter().cloned());

    result.help_used = verdict.help_used;

    result.observations.push(provenance_note(verdict));
    result
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Confidence note distinguishing verifier success, fallback, and process failure.
fn provenance_note(verdict: &VerifierVerdict) -> String {
    match verdict.tier {
        VerdictTier::Fenced | VerdictTier::Balanced => {
            format!("Verifier succeeded (tier {})", verdict.tier)
        }
        VerdictTier::Keyword { cause } => {
            use crate::verifier::FallbackCause;
            let detail = verdict
                .fallback_detail
                .as_deref()
                .map(|d| format!(": {}", d))
                .unwrap_or_default();
            match cause {
                FallbackCause::ParseFailure => format!(
                    "Verifier used its keyword fallback (low confidence){}",
                    detail
                ),
                FallbackCause::Timeout | FallbackCause::ProcessFailure => format!(
                    "Verifier process failed ({}); keyword fallback used (low confidence){}",
                    cause, detail
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::FallbackCause;

    fn heuristic(success: bool) -> HeuristicResult {
        HeuristicResult {
            total_turns: 4,
            success,
            trace_length: 6,
            help_used: false,
            errors_encountered: Vec::new(),
            observations: vec!["seed".to_string()],
            recommendations: Vec::new(),
            evidence_summary: "done".to_string(),
        }
    }

    fn verdict(actual: Option<bool>, discrepancy: bool, tier: VerdictTier) -> VerifierVerdict {
        VerifierVerdict {
            actual_success: actual,
            discrepancy,
            failure_reasons: vec!["PR was never opened".to_string()],
            help_used: Some(true),
            recommendations: vec!["Document --fill".to_string()],
            analysis: "The agent claimed success without creating the PR.".to_string(),
            tier,
            fallback_detail: None,
        }
    }

    #[test]
    fn test_absent_verdict_is_identity() {
        let h = heuristic(true);
        let merged = merge(h.clone(), None);
        assert_eq!(merged, AnalysisResult::from(h));
        assert_eq!(merged.observations, vec!["seed".to_string()]);
        assert_eq!(merged.provenance, Provenance::Heuristic);
    }

    #[test]
    fn test_discrepancy_overrides_success() {
        let v = verdict(Some(false), true, VerdictTier::Fenced);
        let merged = merge(heuristic(true), Some(&v));
        assert!(!merged.success);
        assert!(merged.discrepancy);
        assert_eq!(
            merged.provenance,
            Provenance::Verifier {
                tier: VerdictTier::Fenced
            }
        );
        assert!(merged.observations.iter().any(|o| o.starts_with("Discrepancy:")));
    }

    #[test]
    fn test_unknown_actual_keeps_heuristic() {
        let v = verdict(None, true, VerdictTier::Balanced);
        let merged = merge(heuristic(true), Some(&v));
        assert!(merged.success);
        assert!(!merged.discrepancy);
        assert_eq!(merged.provenance, Provenance::Heuristic);
    }

    #[test]
    fn test_discrepancy_flag_with_matching_verdict_is_not_an_override() {
        let v = verdict(Some(true), true, VerdictTier::Fenced);
        let merged = merge(heuristic(true), Some(&v));
        assert!(merged.success);
        assert!(!merged.discrepancy);
        assert_eq!(merged.provenance, Provenance::Heuristic);
        assert!(!merged.observations.iter().any(|o| o.starts_with("Discrepancy:")));
        assert!(merged
            .observations
            .iter()
            .any(|o| o.starts_with("Verifier flagged a discrepancy but its verdict (success)")));
    }

    #[test]
    fn test_help_used_comes_only_from_verdict() {
        let mut h = heuristic(true);
        h.help_used = true;
        let merged = merge(h.clone(), None);
        assert!(merged.heuristic_help_used);
        assert_eq!(merged.help_used, None);

        let mut v = verdict(Some(true), false, VerdictTier::Keyword {
            cause: FallbackCause::ParseFailure,
        });
        v.help_used = None;
        assert_eq!(merge(h, Some(&v)).help_used, None);
    }

    #[test]
    fn test_agreement_appends_without_override() {
        let v = verdict(Some(true), false, VerdictTier::Fenced);
        let merged = merge(heuristic(true), Some(&v));
        assert!(merged.success);
        assert_eq!(merged.provenance, Provenance::Heuristic);
        assert_eq!(
            merged.observations,
            vec![
                "seed".to_string(),
                "Failure: PR was never opened".to_string(),
                "Verifier analysis: The agent claimed success without creating the PR."
                    .to_string(),
                "Verifier succeeded (tier A (fenced block))".to_string(),
            ]
        );
        assert_eq!(merged.recommendations, vec!["Document --fill".to_string()]);
        assert_eq!(merged.failure_reasons.len(), 1);
        assert_eq!(merged.help_used, Some(true));
    }

    #[test]
    fn test_appends_do_not_deduplicate() {
        let mut v = verdict(Some(true), false, VerdictTier::Fenced);
        v.failure_reasons = vec!["same".to_string(), "same".to_string()];
        let merged = merge(heuristic(true), Some(&v));
        let count = merged
            .observations
            .iter()
            .filter(|o| *o == "Failure: same")
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_provenance_notes_distinguish_failures() {
        let mut fallback = verdict(
            None,
            false,
            VerdictTier::Keyword {
                cause: FallbackCause::ParseFailure,
            },
        );
        fallback.analysis.clear();
        let merged = merge(heuristic(false), Some(&fallback));
        assert!(merged.is_low_confidence());
        assert!(merged
            .observations
            .last()
            .is_some_and(|o| o.starts_with("Verifier used its keyword fallback")));

        let mut crashed = fallback.clone();
        crashed.tier = VerdictTier::Keyword {
            cause: FallbackCause::Timeout,
        };
        crashed.fallback_detail = Some("verifier timed out after 120s".to_string());
        let merged = merge(heuristic(false), Some(&crashed));
        assert!(merged
            .observations
            .last()
            .is_some_and(|o| o.starts_with("Verifier process failed (timeout)")));
    }
}
