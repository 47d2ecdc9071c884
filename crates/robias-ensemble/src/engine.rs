//! The bias ensemble engine.
//!
//! Per document, every configured domain runs the same pipeline with fresh
//! state:
//!
//! 1. linear sentence ranking (always);
//! 2. neural ranking and joint document probability (domains with a neural
//!    oracle only);
//! 3. Borda fusion of both rankings, or the reversed linear ranking when
//!    there is no neural oracle, cut to `top_k`;
//! 4. rationale extraction in fused order;
//! 5. linear document probability over the full text and the joined
//!    rationale text, averaged with the neural probability when present;
//! 6. classification against the threshold.
//!
//! A document without text, or any oracle failure, aborts the whole document.

use crate::error::EngineError;
use crate::fusion::{BordaWeights, RankedList, borda_fuse};
use crate::oracle::{FeatureContext, OracleRegistry, OracleRole, ScoringOracle};
use crate::output::DocumentScores;
use crate::rationale::{SentenceOutOfRange, extract_rationales, join_rationale_text};
use robias_core::{ConfigError, Document, Domain, EnsembleConfig, RiskLabel, ScoreResult};
use tracing::{debug, info, instrument};

/// Validated runtime settings derived from [`EnsembleConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSettings {
    pub threshold: f64,
    pub top_k: Option<usize>,
    pub snippet_width: usize,
    pub weights: BordaWeights,
    pub emit_rationales: bool,
    pub domains: Vec<Domain>,
}

impl TryFrom<&EnsembleConfig> for EnsembleSettings {
    type Error = ConfigError;

    fn try_from(config: &EnsembleConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self {
            threshold: config.threshold,
            top_k: config.top_k,
            snippet_width: config.snippet_width,
            weights: BordaWeights::from(config.fusion_weights),
            emit_rationales: config.emit_rationales,
            domains: config.domains.clone(),
        })
    }
}

impl Default for EnsembleSettings {
    fn default() -> Self {
        let config = EnsembleConfig::default();
        Self {
            threshold: config.threshold,
            top_k: config.top_k,
            snippet_width: config.snippet_width,
            weights: BordaWeights::from(config.fusion_weights),
            emit_rationales: config.emit_rationales,
            domains: config.domains,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BiasEnsemble {
    registry: OracleRegistry,
    settings: EnsembleSettings,
}

impl BiasEnsemble {
    #[must_use]
    pub const fn new(registry: OracleRegistry, settings: EnsembleSettings) -> Self {
        Self { registry, settings }
    }

    /// # Errors
    ///
    /// Invalid ensemble configuration.
    pub fn from_config(registry: OracleRegistry, config: &EnsembleConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(registry, EnsembleSettings::try_from(config)?))
    }

    #[must_use]
    pub const fn settings(&self) -> &EnsembleSettings {
        &self.settings
    }

    #[must_use]
    pub const fn registry(&self) -> &OracleRegistry {
        &self.registry
    }

    /// Score every configured domain for one document.
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingText`] when the document has no usable text;
    /// any other variant when an oracle fails or returns unusable output.
    /// No partial results are returned in either case.
    #[instrument(skip(self, document), fields(sentences = document.sentences().len()))]
    pub fn annotate(&self, document: &Document, filename: &str) -> Result<DocumentScores, EngineError> {
        if !document.has_text() {
            return Err(EngineError::MissingText {
                filename: filename.to_string(),
            });
        }

        info!("starting modeling");
        let results = self
            .settings
            .domains
            .iter()
            .map(|&domain| self.score_domain(document, filename, domain))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DocumentScores::assemble(filename, results, &self.settings.domains))
    }

    /// Score a single domain. Does not apply the missing-text guard.
    ///
    /// # Errors
    ///
    /// Oracle failures and invalid oracle output.
    pub fn score_domain(&self, document: &Document, filename: &str, domain: Domain) -> Result<ScoreResult, EngineError> {
        let call = OracleCall {
            filename,
            domain,
            sentences: document.sentences().len(),
        };

        let linear = self.registry.linear();
        let linear_ranking = linear
            .rank_sentences(document, domain)
            .map_err(|cause| call.failed(OracleRole::Linear, cause))?;
        call.check_ranking(OracleRole::Linear, &linear_ranking.order)?;
        debug!(%domain, ranked = linear_ranking.order.len(), "linear ranking done");

        let neural = match self.registry.neural(domain) {
            Some(oracle) => {
                let ranking = oracle
                    .rank_sentences(document, domain)
                    .map_err(|cause| call.failed(OracleRole::Neural, cause))?;
                call.check_ranking(OracleRole::Neural, &ranking.order)?;
                if let Some(p) = ranking.document_probability {
                    call.check_probability(OracleRole::Neural, p)?;
                }
                debug!(
                    %domain,
                    ranked = ranking.order.len(),
                    probability = ?ranking.document_probability,
                    "neural ranking done"
                );
                Some(ranking)
            }
            None => None,
        };

        let mut fused: RankedList = match &neural {
            Some(ranking) => borda_fuse(&ranking.order, &linear_ranking.order, self.settings.weights),
            None => linear_ranking.order.iter().rev().copied().collect(),
        };
        if let Some(k) = self.settings.top_k {
            fused.truncate(k);
        }
        let fused_role = if neural.is_some() {
            OracleRole::Neural
        } else {
            OracleRole::Linear
        };

        let linear_probability = linear_document_probability(linear, document, domain, &fused)
            .map_err(|cause| call.failed(OracleRole::Linear, cause))?;
        call.check_probability(OracleRole::Linear, linear_probability)?;

        let probability = match neural.and_then(|r| r.document_probability) {
            Some(neural_probability) => (neural_probability + linear_probability) / 2.0,
            None => linear_probability,
        };
        let label = RiskLabel::classify(probability, self.settings.threshold);
        debug!(%domain, rationales = fused.len(), probability, %label, "domain scored");

        let rationale = self
            .settings
            .emit_rationales
            .then(|| extract_rationales(document, &fused, self.settings.snippet_width))
            .transpose()
            .map_err(|err| call.out_of_range(fused_role, err))?;

        Ok(ScoreResult {
            filename: filename.to_string(),
            domain,
            probability,
            label,
            rationale,
        })
    }
}

/// Linear re-scoring of the document together with its rationale sentences.
///
/// Also usable on its own: the ensemble's probability for a domain without a
/// neural oracle is exactly this value.
///
/// # Errors
///
/// Failures from the linear oracle, or a `rationale_order` index past the
/// last sentence.
pub fn linear_document_probability(
    linear: &dyn ScoringOracle,
    document: &Document,
    domain: Domain,
    rationale_order: &[usize],
) -> anyhow::Result<f64> {
    let rationale_text = join_rationale_text(document, rationale_order)?;
    let features = FeatureContext::for_document(document, domain, &rationale_text);
    linear.document_probability(&features)
}

struct OracleCall<'a> {
    filename: &'a str,
    domain: Domain,
    sentences: usize,
}

impl OracleCall<'_> {
    fn failed(&self, role: OracleRole, source: anyhow::Error) -> EngineError {
        EngineError::Oracle {
            filename: self.filename.to_string(),
            domain: self.domain,
            role,
            source,
        }
    }

    fn out_of_range(&self, role: OracleRole, err: SentenceOutOfRange) -> EngineError {
        EngineError::InvalidRanking {
            filename: self.filename.to_string(),
            domain: self.domain,
            role,
            index: err.index,
            sentences: err.sentences,
        }
    }

    fn check_ranking(&self, role: OracleRole, order: &[usize]) -> Result<(), EngineError> {
        match order.iter().find(|&&i| i >= self.sentences) {
            Some(&index) => Err(EngineError::InvalidRanking {
                filename: self.filename.to_string(),
                domain: self.domain,
                role,
                index,
                sentences: self.sentences,
            }),
            None => Ok(()),
        }
    }

    fn check_probability(&self, role: OracleRole, value: f64) -> Result<(), EngineError> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(EngineError::InvalidProbability {
                filename: self.filename.to_string(),
                domain: self.domain,
                role,
                value,
            })
        }
    }
}
