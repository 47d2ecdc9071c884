#![forbid(unsafe_code)]
//! robias-ensemble library.
//!
//! Combines a neural sentence-rationale ranker and a linear bag-of-features
//! classifier into one probability of low risk of bias per domain, plus a
//! ranked list of supporting sentences.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at the crate surface; oracle
//!   implementations report `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod engine;
pub mod error;
pub mod fusion;
pub mod oracle;
pub mod output;
pub mod rationale;

pub use engine::{BiasEnsemble, EnsembleSettings, linear_document_probability};
pub use error::EngineError;
pub use fusion::{BordaWeights, RankedList, borda_fuse};
pub use oracle::{
    FeatureContext, LinearModel, LinearOracle, OracleLoader, OracleRegistry, OracleRole, ScoringOracle,
    SentenceRanking,
};
pub use output::{DocumentScores, ScoreRow};
