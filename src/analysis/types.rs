//! Analysis records exposed to reporting.

use serde::{Deserialize, Serialize};

use crate::verifier::VerdictTier;

/// Which signal decided the final `success` value of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// The offline heuristic (verifier absent, agreed, or undecided).
    Heuristic,
    /// The secondary verifier overrode the heuristic.
    Verifier { tier: VerdictTier },
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Heuristic => write!(f, "heuristic"),
            Provenance::Verifier { tier } => write!(f, "verifier tier {}", tier),
        }
    }
}

/// Output of the heuristic pass over a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicResult {
    /// Number of assistant turns.
    pub total_turns: usize,
    /// Terminal result present with subtype `"success"`.
    pub success: bool,
    /// Number of events in the trace.
    pub trace_length: usize,
    /// An assistant turn mentioned a help flag.
    pub help_used: bool,
    /// Short excerpts of assistant turns that mention errors.
    pub errors_encountered: Vec<String>,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
    /// Excerpt of the terminal result, if any.
    pub evidence_summary: String,
}

/// Final per-run verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_turns: usize,
    pub success: bool,
    /// The verifier contradicted the heuristic with a known verdict.
    pub discrepancy: bool,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
    pub evidence_summary: String,
    pub provenance: Provenance,
    /// Failure reasons reported by the verifier.
    pub failure_reasons: Vec<String>,
    /// Help-flag usage as the verifier reported it. Only this feeds the sweep's help-usage rate.
    pub help_used: Option<bool>,
    /// An assistant turn mentioned a help flag.
    #[serde(default)]
    pub heuristic_help_used: bool,
    pub errors_encountered: Vec<String>,
    /// Tier of the verdict that was merged, if the verifier ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier_tier: Option<VerdictTier>,
}

impl AnalysisResult {
    /// Number of issues this run contributes to aggregate statistics.
    pub fn issue_count(&self) -> usize {
        self.failure_reasons.len()
    }

    /// True when the verifier ran but had to fall back to keyword search.
    pub fn is_low_confidence(&self) -> bool {
        self.verifier_tier.is_some_and(|t| t.is_degraded())
    }
}

impl From<HeuristicResult> for AnalysisResult {
    fn from(h: HeuristicResult) -> Self {
        Self {
            total_turns: h.total_turns,
            success: h.success,
            discrepancy: false,
            observations: h.observations,
            recommendations: h.recommendations,
            evidence_summary: h.evidence_summary,
            provenance: Provenance::Heuristic,
            failure_reasons: Vec::new(),
            help_used: None,
            heuristic_help_used: h.help_used,
            errors_encountered: h.errors_encountered,
            verifier_tier: None,
        }
    }
}
