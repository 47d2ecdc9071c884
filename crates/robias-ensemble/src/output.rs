//! Per-document result assembly.

use robias_core::{Domain, ScoreResult};
use serde::{Deserialize, Serialize};

/// All domain results for one document, in canonical domain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentScores {
    pub filename: String,
    pub results: Vec<ScoreResult>,
}

/// Flat record handed to tabular exporters: one row per domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub filename: String,
    /// Human-readable domain label.
    pub domain: String,
    pub prob: f64,
}

impl DocumentScores {
    /// Order `results` by each domain's position in `canonical`, whatever
    /// order they were produced in. Domains missing from `canonical` sort
    /// last, keeping their relative order.
    #[must_use]
    pub fn assemble(filename: impl Into<String>, mut results: Vec<ScoreResult>, canonical: &[Domain]) -> Self {
        results.sort_by_key(|r| {
            canonical
                .iter()
                .position(|d| *d == r.domain)
                .unwrap_or(canonical.len())
        });
        Self {
            filename: filename.into(),
            results,
        }
    }

    #[must_use]
    pub fn get(&self, domain: Domain) -> Option<&ScoreResult> {
        self.results.iter().find(|r| r.domain == domain)
    }

    #[must_use]
    pub fn domains(&self) -> Vec<Domain> {
        self.results.iter().map(|r| r.domain).collect()
    }

    #[must_use]
    pub fn rows(&self) -> Vec<ScoreRow> {
        self.results
            .iter()
            .map(|r| ScoreRow {
                filename: r.filename.clone(),
                domain: r.domain_label().to_string(),
                prob: r.probability,
            })
            .collect()
    }
}
