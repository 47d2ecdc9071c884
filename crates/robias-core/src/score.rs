//! Per-domain score records produced for each document.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default probability threshold separating low from high/unclear risk.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Informational risk judgement derived from a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "high/unclear")]
    HighUnclear,
}

impl RiskLabel {
    /// `Low` when `probability >= threshold` (inclusive lower bound).
    #[must_use]
    pub fn classify(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Self::Low
        } else {
            Self::HighUnclear
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::HighUnclear => "high/unclear",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sentence offered as evidence, with surrounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rationale {
    pub sentence_text: String,
    pub start: usize,
    pub end: usize,
    /// Up to `snippet_width` characters before `start`.
    pub prefix_snippet: String,
    /// Up to `snippet_width` characters from `end` onwards.
    pub suffix_snippet: String,
}

/// Result for one (document, domain) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub filename: String,
    pub domain: Domain,
    /// Probability of low risk of bias, in `[0, 1]`.
    pub probability: f64,
    pub label: RiskLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<Vec<Rationale>>,
}

impl ScoreResult {
    #[must_use]
    pub const fn domain_label(&self) -> &'static str {
        self.domain.label()
    }
}
