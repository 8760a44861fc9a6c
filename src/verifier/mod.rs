//! Secondary verifier backed by an external reasoning engine.
//!
//! # Architecture
//!
//! ```text
//! Trace ─→ summarize_trace ─→ build_prompt ─→ ReasoningEngine (isolated process)
//!                                                   │
//!                    ┌──────────────────────────────┘
//!                    ▼
//!   Tier A FencedBlockParser ─→ Tier B BalancedSpanParser ─→ Tier C keyword_verdict
//! ```
//!
//! [`Verifier::verify`] never fails: engine errors, timeouts, panics and
//! unparseable replies all land on the keyword fallback, tagged with the
//! cause in [`VerdictTier::Keyword`].

pub mod config;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod verdict;
pub mod worker;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{info, warn};

use crate::trace::Trace;
use crate::utils::truncate_chars;

pub use config::{VerifierConfig, DEFAULT_VERIFIER_TIMEOUT};
pub use fallback::keyword_verdict;
pub use parser::{parse_reply, ResponseParser, PARSER_CHAIN};
pub use prompt::{build_prompt, claimed_label, summarize_trace};
pub use verdict::{FallbackCause, VerdictTier, VerifierFailure, VerifierVerdict};
pub use worker::{IsolatedWorker, ReasoningEngine};

/// Characters of an unparseable reply kept as fallback detail.
const REPLY_PREVIEW_CHARS: usize = 200;

/// Context needed to verify one run.
#[derive(Debug, Clone, Copy)]
pub struct VerificationRequest<'a> {
    pub trace: &'a Trace,
    pub scenario_text: &'a str,
    pub tool: &'a str,
    /// Success as claimed by the run (the heuristic verdict).
    pub claimed_success: Option<bool>,
}

/// Verifies runs against an engine.
#[derive(Clone)]
pub struct Verifier {
    engine: Arc<dyn ReasoningEngine>,
}

impl Verifier {
    pub fn new(engine: Arc<dyn ReasoningEngine>) -> Self {
        Self { engine }
    }

    /// Verifier launching the engine as an isolated process per call.
    pub fn isolated(config: VerifierConfig) -> Self {
        Self::new(Arc::new(IsolatedWorker::new(config)))
    }

    /// Produces a verdict. Never fails.
    pub async fn verify(&self, request: &VerificationRequest<'_>) -> VerifierVerdict {
        let summary = summarize_trace(request.trace);
        let prompt = build_prompt(
            request.scenario_text,
            request.tool,
            request.claimed_success,
            &summary,
        );
        let claimed = request.claimed_success;

        let outcome = AssertUnwindSafe(self.engine.complete(&prompt))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(VerifierFailure::Process(
                    "reasoning engine panicked".to_string(),
                ))
            });

        let failure = match outcome {
            Ok(reply) => match parse_reply(&reply, claimed) {
                Some(verdict) => {
                    info!(
                        tool = request.tool,
                        tier = %verdict.tier,
                        actual_success = ?verdict.actual_success,
                        discrepancy = verdict.discrepancy,
                        "Verifier verdict parsed"
                    );
                    return verdict;
                }
                None => VerifierFailure::Parse(format!(
                    "no structured verdict in reply starting with '{}'",
                    truncate_chars(reply.trim(), REPLY_PREVIEW_CHARS)
                )),
            },
            Err(failure) => failure,
        };

        warn!(
            tool = request.tool,
            cause = %failure.cause(),
            error = %failure,
            "Verifier degraded to keyword fallback"
        );
        keyword_verdict(&summary, claimed, failure.cause(), Some(failure.to_string()))
    }
}
