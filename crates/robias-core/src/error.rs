use std::fmt;

/// Machine-readable error codes shared by every robias crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ConfigInvalid,
    ArtifactMissing,
    ArtifactChecksumMismatch,
    OracleLoadFailed,
    MissingText,
    InvalidDocument,
    OracleFailure,
    InvalidRanking,
    InvalidProbability,
    FeatureShapeMismatch,
    UnsupportedOperation,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ConfigInvalid => "E1002",
            Self::ArtifactMissing => "E2001",
            Self::ArtifactChecksumMismatch => "E2002",
            Self::OracleLoadFailed => "E2003",
            Self::MissingText => "E3001",
            Self::InvalidDocument => "E3002",
            Self::OracleFailure => "E4001",
            Self::InvalidRanking => "E4002",
            Self::InvalidProbability => "E4003",
            Self::FeatureShapeMismatch => "E4004",
            Self::UnsupportedOperation => "E4005",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigInvalid => "Config value out of range",
            Self::ArtifactMissing => "Model artifact not found",
            Self::ArtifactChecksumMismatch => "Model artifact checksum mismatch",
            Self::OracleLoadFailed => "Scoring model failed to load",
            Self::MissingText => "Document has no parsed text",
            Self::InvalidDocument => "Document sentence spans are invalid",
            Self::OracleFailure => "Scoring model call failed",
            Self::InvalidRanking => "Sentence ranking references an unknown sentence",
            Self::InvalidProbability => "Probability outside [0, 1]",
            Self::FeatureShapeMismatch => "Feature views disagree on row count",
            Self::UnsupportedOperation => "Scoring model does not support this operation",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix the TOML syntax in the robias config file and retry."),
            Self::ConfigInvalid => Some("Check threshold, weights, top_k and domain lists."),
            Self::ArtifactMissing => Some("Verify the artifacts root contains the per-domain model files."),
            Self::ArtifactChecksumMismatch => {
                Some("Re-download the model artifacts or update manifest.toml.")
            }
            Self::OracleLoadFailed => Some("Verify model files and runtime dependencies are available."),
            Self::MissingText => Some("Check the text extraction step for this file."),
            Self::InvalidDocument => Some("Re-run sentence segmentation on the extracted text."),
            Self::OracleFailure | Self::InvalidRanking | Self::InvalidProbability => {
                Some("The document is skipped; inspect the model logs for this file.")
            }
            Self::FeatureShapeMismatch | Self::UnsupportedOperation => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
