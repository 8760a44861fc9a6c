//! Trace analysis and verdict reconciliation.
//!
//! # Pipeline
//!
//! ```text
//! Trace → heuristic::analyze_trace ─┐
//!                                   ├→ merger::merge → AnalysisResult
//! Trace → Verifier::verify ─────────┘
//!
//! [AnalysisResult; N] → aggregate::aggregate → AggregateResult
//! ```
//!
//! Every stage here is pure. The only I/O in the pipeline lives in the
//! verifier's isolated worker.

pub mod aggregate;
pub mod heuristic;
pub mod merger;
pub mod types;

pub use aggregate::{aggregate, common_threshold, AggregateResult};
pub use heuristic::analyze_trace;
pub use merger::merge;
pub use types::{AnalysisResult, HeuristicResult, Provenance};
