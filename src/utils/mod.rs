//! Shared utility functions for agentprobe.
//!
//! Currently JSON span location and char-safe truncation, used by the trace
//! summarizer and the verifier's reply parsers.

pub mod json_extraction;

pub use json_extraction::{
    fenced_blocks, find_matching_brace, first_balanced_object, truncate_chars,
    truncate_with_ellipsis,
};
