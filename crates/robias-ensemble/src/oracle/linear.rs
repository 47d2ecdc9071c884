//! Linear bag-of-features oracle.
//!
//! Wraps two externally trained linear models that share one feature
//! hashing setup: a sentence-level model used for ranking and a
//! document-level model used for the probability. Both are joint
//! multi-domain models; the domain enters through tagged feature views.

use super::features::FeatureContext;
use super::{OracleRole, ScoringOracle, SentenceRanking, argsort_ascending};
use anyhow::{Result, bail, ensure};
use robias_core::{Document, Domain};
use tracing::trace;

/// A trained linear classifier that vectorizes a [`FeatureContext`] itself.
pub trait LinearModel: Send + Sync {
    /// Signed margin per context row.
    ///
    /// # Errors
    ///
    /// Vectorization or parameter failures.
    fn decision_function(&self, features: &FeatureContext<'_>) -> Result<Vec<f64>>;

    /// Probability of the positive (low risk) class per context row.
    ///
    /// # Errors
    ///
    /// Vectorization or parameter failures.
    fn predict_proba(&self, features: &FeatureContext<'_>) -> Result<Vec<f64>>;
}

pub struct LinearOracle<S, D> {
    sentence_model: S,
    document_model: D,
}

impl<S: LinearModel, D: LinearModel> LinearOracle<S, D> {
    #[must_use]
    pub const fn new(sentence_model: S, document_model: D) -> Self {
        Self {
            sentence_model,
            document_model,
        }
    }
}

impl<S: LinearModel, D: LinearModel> ScoringOracle for LinearOracle<S, D> {
    fn role(&self) -> OracleRole {
        OracleRole::Linear
    }

    fn rank_sentences(&self, document: &Document, domain: Domain) -> Result<SentenceRanking> {
        let n = document.sentences().len();
        if n == 0 {
            return Ok(SentenceRanking::order_only(Vec::new()));
        }

        let features = FeatureContext::for_sentences(document, domain);
        let margins = self.sentence_model.decision_function(&features)?;
        ensure!(
            margins.len() == n,
            "sentence model returned {} margins for {n} sentences",
            margins.len()
        );
        trace!(%domain, sentences = n, "linear sentence margins computed");

        Ok(SentenceRanking::order_only(argsort_ascending(&margins)))
    }

    fn document_probability(&self, features: &FeatureContext<'_>) -> Result<f64> {
        let probabilities = self.document_model.predict_proba(features)?;
        match probabilities.first() {
            Some(&p) => Ok(p),
            None => bail!("document model returned no probability"),
        }
    }
}
