//! Tier C: deterministic keyword verdict.
//!
//! Used whenever the engine is unavailable or its reply has no usable
//! structure. Always produces a verdict.

use super::prompt::claimed_label;
use super::verdict::{FallbackCause, VerdictTier, VerifierVerdict};

/// A failure phrase and what it means for the CLI under test.
struct FailureSignal {
    phrase: &'static str,
    reason: &'static str,
    recommendation: &'static str,
    /// Strong signals force `actual_success = false`.
    strong: bool,
}

/// Phrases searched for in the lowercased trace summary, in report order.
///
/// A bare "authentication" is weak: it also appears in help text and in
/// successful login output, so it adds a recommendation without deciding
/// the outcome. "not authenticated" is the strong form.
const FAILURE_SIGNALS: &[FailureSignal] = &[
    FailureSignal {
        phrase: "permission denied",
        reason: "Permission denied while executing commands",
        recommendation: "State required permissions and how to obtain them in the error message",
        strong: true,
    },
    FailureSignal {
        phrase: "access denied",
        reason: "Access denied by the tool or remote service",
        recommendation: "State required permissions and how to obtain them in the error message",
        strong: true,
    },
    FailureSignal {
        phrase: "not authenticated",
        reason: "Tool reported the session is not authenticated",
        recommendation: "Point to the login command when authentication is missing",
        strong: true,
    },
    FailureSignal {
        phrase: "authentication",
        reason: "Possible authentication problem",
        recommendation: "Point to the login command when authentication is missing",
        strong: false,
    },
    FailureSignal {
        phrase: "unknown option",
        reason: "Agent passed an unknown option",
        recommendation: "Suggest the closest valid option when an unknown flag is passed",
        strong: true,
    },
    FailureSignal {
        phrase: "unexpected option",
        reason: "Agent passed an unexpected option",
        recommendation: "Suggest the closest valid option when an unknown flag is passed",
        strong: true,
    },
];

/// Builds a keyword verdict from the trace summary and the claimed outcome.
pub fn keyword_verdict(
    summary: &str,
    claimed: Option<bool>,
    cause: FallbackCause,
    detail: Option<String>,
) -> VerifierVerdict {
    let haystack = format!("{}\n{}", summary, claimed_label(claimed)).to_lowercase();

    let matched: Vec<&FailureSignal> = FAILURE_SIGNALS
        .iter()
        .filter(|signal| haystack.contains(signal.phrase))
        .collect();

    let strong_hit = matched.iter().any(|s| s.strong);
    let actual_success = if strong_hit { Some(false) } else { None };
    let discrepancy = matches!((actual_success, claimed), (Some(a), Some(c)) if a != c);

    let failure_reasons = matched
        .iter()
        .filter(|s| s.strong)
        .map(|s| s.reason.to_string())
        .collect();

    let mut recommendations: Vec<String> = Vec::new();
    for signal in &matched {
        if !recommendations.iter().any(|r| r == signal.recommendation) {
            recommendations.push(signal.recommendation.to_string());
        }
    }

    let analysis = if matched.is_empty() {
        format!("Keyword fallback after {}: no known failure phrases found", cause)
    } else {
        let phrases: Vec<&str> = matched.iter().map(|s| s.phrase).collect();
        format!(
            "Keyword fallback after {}: matched {}",
            cause,
            phrases.join(", ")
        )
    };

    VerifierVerdict {
        actual_success,
        discrepancy,
        failure_reasons,
        help_used: None,
        recommendations,
        analysis,
        tier: VerdictTier::Keyword { cause },
        fallback_detail: detail,
    }
}
