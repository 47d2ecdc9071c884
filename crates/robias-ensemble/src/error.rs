use crate::oracle::OracleRole;
use robias_core::{Domain, ErrorCode};

/// Document-level failure. Any variant means the whole document produced
/// no scores; callers must not keep partial per-domain results.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The document has no usable parsed text.
    #[error("{filename}: document has no parsed text")]
    MissingText { filename: String },

    /// An oracle call failed.
    #[error("{filename}: {role} oracle failed on {domain}: {source:#}")]
    Oracle {
        filename: String,
        domain: Domain,
        role: OracleRole,
        source: anyhow::Error,
    },

    /// A ranking named a sentence the document does not have.
    #[error("{filename}: {role} ranking for {domain} references sentence {index}, document has {sentences}")]
    InvalidRanking {
        filename: String,
        domain: Domain,
        role: OracleRole,
        index: usize,
        sentences: usize,
    },

    /// A probability was NaN or outside `[0, 1]`.
    #[error("{filename}: {role} probability {value} for {domain} is outside [0, 1]")]
    InvalidProbability {
        filename: String,
        domain: Domain,
        role: OracleRole,
        value: f64,
    },
}

impl EngineError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingText { .. } => ErrorCode::MissingText,
            Self::Oracle { .. } => ErrorCode::OracleFailure,
            Self::InvalidRanking { .. } => ErrorCode::InvalidRanking,
            Self::InvalidProbability { .. } => ErrorCode::InvalidProbability,
        }
    }

    /// Whether this is the missing-text sentinel rather than a scoring
    /// failure.
    #[must_use]
    pub const fn is_missing_text(&self) -> bool {
        matches!(self, Self::MissingText { .. })
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        match self {
            Self::MissingText { filename }
            | Self::Oracle { filename, .. }
            | Self::InvalidRanking { filename, .. }
            | Self::InvalidProbability { filename, .. } => filename,
        }
    }
}
