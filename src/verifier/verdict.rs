//! Verdict produced by the secondary verifier.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which parse or fallback path produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum VerdictTier {
    /// Tier A: fenced structured block.
    Fenced,
    /// Tier B: first balanced `{...}` span in free text.
    Balanced,
    /// Tier C: deterministic keyword search over the trace.
    Keyword { cause: FallbackCause },
}

impl VerdictTier {
    /// True when the engine's own answer was unusable.
    pub fn is_degraded(&self) -> bool {
        matches!(self, VerdictTier::Keyword { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerdictTier::Fenced => "A (fenced block)",
            VerdictTier::Balanced => "B (inline object)",
            VerdictTier::Keyword { .. } => "C (keyword fallback)",
        }
    }
}

impl std::fmt::Display for VerdictTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictTier::Keyword { cause } => write!(f, "{} after {}", self.label(), cause),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Why the verifier ended up on its keyword fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCause {
    /// The engine answered but no structured verdict could be extracted.
    ParseFailure,
    /// The isolated process exceeded its wall-clock budget.
    Timeout,
    /// The isolated process could not be launched or crashed.
    ProcessFailure,
}

impl std::fmt::Display for FallbackCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackCause::ParseFailure => write!(f, "parse failure"),
            FallbackCause::Timeout => write!(f, "timeout"),
            FallbackCause::ProcessFailure => write!(f, "process failure"),
        }
    }
}

/// Failures of a single verifier attempt. Never escapes the verifier.
#[derive(Debug, Error)]
pub enum VerifierFailure {
    #[error("verifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("verifier process failed: {0}")]
    Process(String),

    #[error("verifier reply could not be parsed: {0}")]
    Parse(String),

    #[error("verifier I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VerifierFailure {
    pub fn cause(&self) -> FallbackCause {
        match self {
            VerifierFailure::Timeout(_) => FallbackCause::Timeout,
            VerifierFailure::Parse(_) => FallbackCause::ParseFailure,
            VerifierFailure::Process(_) | VerifierFailure::Io(_) => FallbackCause::ProcessFailure,
        }
    }
}

/// Structured verdict on one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierVerdict {
    /// Assessed success; `None` when the verifier could not tell.
    pub actual_success: Option<bool>,
    /// Whether the assessment contradicts the claimed outcome.
    pub discrepancy: bool,
    pub failure_reasons: Vec<String>,
    pub help_used: Option<bool>,
    pub recommendations: Vec<String>,
    /// Full narrative from the engine (or the fallback's explanation).
    pub analysis: String,
    pub tier: VerdictTier,
    /// Error text for degraded verdicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_detail: Option<String>,
}

impl VerifierVerdict {
    pub fn is_degraded(&self) -> bool {
        self.tier.is_degraded()
    }
}
