//! Ordered parser chain for verifier replies.
//!
//! Each [`ResponseParser`] is total: it either yields a verdict or `None`.
//! [`parse_reply`] walks [`PARSER_CHAIN`] and stops at the first match; when
//! nothing matches the caller falls back to [`super::fallback`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::utils::{fenced_blocks, first_balanced_object};

use super::verdict::{VerdictTier, VerifierVerdict};

/// Verdict fields as the engine is asked to return them.
///
/// Decoding is lenient: the engine is an untrusted oracle and routinely
/// returns strings for booleans or a bare string for a list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawVerdict {
    #[serde(default, alias = "actualSuccess", deserialize_with = "lenient_bool")]
    pub actual_success: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub discrepancy: Option<bool>,
    #[serde(
        default,
        alias = "failureReasons",
        alias = "issues",
        deserialize_with = "lenient_list"
    )]
    pub failure_reasons: Vec<String>,
    #[serde(default, alias = "helpUsed", deserialize_with = "lenient_bool")]
    pub help_used: Option<bool>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub recommendations: Vec<String>,
    #[serde(default, alias = "reasoning", deserialize_with = "lenient_text")]
    pub analysis: String,
}

impl RawVerdict {
    /// Decodes a candidate span. Objects lacking both verdict keys are rejected.
    pub fn from_span(span: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(span).ok()?;
        let obj = value.as_object()?;
        let has_verdict_key = ["actual_success", "actualSuccess", "discrepancy"]
            .iter()
            .any(|k| obj.contains_key(*k));
        if !has_verdict_key {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Completes the verdict against the claimed outcome.
    ///
    /// A missing `discrepancy` is derived from actual vs claimed when both are known.
    pub fn into_verdict(self, claimed: Option<bool>, tier: VerdictTier) -> VerifierVerdict {
        let derived = matches!((self.actual_success, claimed), (Some(a), Some(c)) if a != c);
        VerifierVerdict {
            actual_success: self.actual_success,
            discrepancy: self.discrepancy.unwrap_or(derived),
            failure_reasons: self.failure_reasons,
            help_used: self.help_used,
            recommendations: self.recommendations,
            analysis: self.analysis,
            tier,
            fallback_detail: None,
        }
    }
}

/// One strategy for extracting a verdict from a free-text reply.
pub trait ResponseParser: Send + Sync {
    fn tier(&self) -> VerdictTier;

    fn parse(&self, reply: &str) -> Option<RawVerdict>;
}

/// Tier A: first fenced block that decodes as a verdict.
pub struct FencedBlockParser;

impl ResponseParser for FencedBlockParser {
    fn tier(&self) -> VerdictTier {
        VerdictTier::Fenced
    }

    fn parse(&self, reply: &str) -> Option<RawVerdict> {
        fenced_blocks(reply).into_iter().find_map(RawVerdict::from_span)
    }
}

/// Tier B: the first balanced `{...}` span anywhere in the reply.
pub struct BalancedSpanParser;

impl ResponseParser for BalancedSpanParser {
    fn tier(&self) -> VerdictTier {
        VerdictTier::Balanced
    }

    fn parse(&self, reply: &str) -> Option<RawVerdict> {
        first_balanced_object(reply).and_then(RawVerdict::from_span)
    }
}

/// Structured parsers in priority order.
pub const PARSER_CHAIN: &[&dyn ResponseParser] = &[&FencedBlockParser, &BalancedSpanParser];

/// Runs the structured parsers in order; `None` means fall back to keywords.
pub fn parse_reply(reply: &str, claimed: Option<bool>) -> Option<VerifierVerdict> {
    PARSER_CHAIN.iter().find_map(|parser| {
        parser
            .parse(reply)
            .map(|raw| raw.into_verdict(claimed, parser.tier()))
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "success" => Some(true),
            "false" | "no" | "failure" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::String(_) | Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
