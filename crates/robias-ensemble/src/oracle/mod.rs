//! Scoring oracle contract.
//!
//! The ensemble treats its models as opaque scoring services. Two kinds
//! exist and both implement [`ScoringOracle`]:
//!
//! - the **linear** oracle, registered for every domain, ranks sentences and
//!   re-scores arbitrary [`FeatureContext`]s into a document probability;
//! - the **neural** rationale ranker, registered for a configured subset of
//!   domains, ranks sentences and returns its document probability from the
//!   same inference pass.
//!
//! Oracles are constructed once at startup and shared read-only, hence the
//! `&self` receivers and `Send + Sync` bound. Failures are `anyhow` errors
//! because implementations live outside this crate.

pub mod artifacts;
pub mod features;
pub mod linear;
pub mod registry;

pub use artifacts::{ArtifactError, ArtifactStore, LinearArtifacts, NeuralArtifacts};
pub use features::{FeatureContext, FeatureError, FeatureView};
pub use linear::{LinearModel, LinearOracle};
pub use registry::{OracleLoader, OracleRegistry, RegistryError};

use crate::fusion::RankedList;
use anyhow::Result;
use robias_core::{Document, Domain};
use std::fmt;

/// Output of [`ScoringOracle::rank_sentences`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRanking {
    /// Sentence indices, increasing preference.
    pub order: RankedList,
    /// Document probability computed jointly with the ranking, if the
    /// oracle produces one.
    pub document_probability: Option<f64>,
}

impl SentenceRanking {
    #[must_use]
    pub const fn order_only(order: RankedList) -> Self {
        Self {
            order,
            document_probability: None,
        }
    }

    #[must_use]
    pub const fn with_probability(order: RankedList, probability: f64) -> Self {
        Self {
            order,
            document_probability: Some(probability),
        }
    }
}

/// Which slot of the ensemble an oracle fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleRole {
    Linear,
    Neural,
}

impl fmt::Display for OracleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linear => "linear",
            Self::Neural => "neural",
        })
    }
}

/// Returned by oracles asked for something they cannot compute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} oracle does not support {operation}")]
pub struct Unsupported {
    pub role: OracleRole,
    pub operation: &'static str,
}

/// A long-lived, read-only scoring model.
pub trait ScoringOracle: Send + Sync {
    fn role(&self) -> OracleRole;

    /// Rank the document's sentences for `domain`, least relevant first.
    ///
    /// # Errors
    ///
    /// Any model failure; the ensemble aborts the document.
    fn rank_sentences(&self, document: &Document, domain: Domain) -> Result<SentenceRanking>;

    /// Score an accumulated feature context into one probability of low
    /// risk of bias.
    ///
    /// # Errors
    ///
    /// Model failures, or [`Unsupported`] for oracles that only produce a
    /// probability jointly with their ranking.
    fn document_probability(&self, features: &FeatureContext<'_>) -> Result<f64> {
        let _ = features;
        Err(Unsupported {
            role: self.role(),
            operation: "document_probability",
        }
        .into())
    }
}

/// Indices of `scores` ordered by ascending score (stable, NaN last).
#[must_use]
pub fn argsort_ascending(scores: &[f64]) -> RankedList {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&x, &y| {
        let (sx, sy) = (scores[x], scores[y]);
        match (sx.is_nan(), sy.is_nan()) {
            (false, false) => sx.total_cmp(&sy),
            (a, b) => a.cmp(&b),
        }
    });
    order
}
