use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Risk-of-bias domains scored for every document.
///
/// The declaration order is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "RSG")]
    RandomSequenceGeneration,
    #[serde(rename = "AC")]
    AllocationConcealment,
    #[serde(rename = "BPP")]
    BlindingParticipantsPersonnel,
    #[serde(rename = "BOA")]
    BlindingOutcomeAssessment,
}

impl Domain {
    /// Every domain, in canonical order.
    pub const ALL: [Self; 4] = [
        Self::RandomSequenceGeneration,
        Self::AllocationConcealment,
        Self::BlindingParticipantsPersonnel,
        Self::BlindingOutcomeAssessment,
    ];

    /// Short code used in configuration and artifact paths.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RandomSequenceGeneration => "RSG",
            Self::AllocationConcealment => "AC",
            Self::BlindingParticipantsPersonnel => "BPP",
            Self::BlindingOutcomeAssessment => "BOA",
        }
    }

    /// Human-readable label. Also the text the linear oracle tags features
    /// with, so it must not change without retraining.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RandomSequenceGeneration => "Random sequence generation",
            Self::AllocationConcealment => "Allocation concealment",
            Self::BlindingParticipantsPersonnel => "Blinding of participants and personnel",
            Self::BlindingOutcomeAssessment => "Blinding of outcome assessment",
        }
    }

    /// Tag marking the domain/rationale-sentence interaction feature group.
    #[must_use]
    pub fn sentence_interaction_tag(self) -> String {
        format!("-s-{}", self.label())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bias domain '{0}' (expected one of RSG, AC, BPP, BOA)")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(trimmed) || d.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}
