use crate::domain::Domain;
use crate::error::ErrorCode;
use crate::score::DEFAULT_THRESHOLD;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const DEFAULT_SNIPPET_WIDTH: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobiasConfig {
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
}

/// Knobs for the per-domain fusion and probability blending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Keep only the first `top_k` rationale sentences; unbounded when unset.
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default = "default_snippet_width")]
    pub snippet_width: usize,
    /// Borda weights for the (neural, linear) rankings.
    #[serde(default = "default_fusion_weights")]
    pub fusion_weights: [f64; 2],
    #[serde(default = "default_true")]
    pub emit_rationales: bool,
    /// Canonical output order.
    #[serde(default = "default_domains")]
    pub domains: Vec<Domain>,
    /// Domains that get a neural oracle at startup.
    #[serde(default = "default_domains")]
    pub neural_domains: Vec<Domain>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_k: None,
            snippet_width: default_snippet_width(),
            fusion_weights: default_fusion_weights(),
            emit_rationales: default_true(),
            domains: default_domains(),
            neural_domains: default_domains(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl ArtifactsConfig {
    /// The configured root, or `<data dir>/robias/models`.
    ///
    /// # Errors
    ///
    /// Fails when no root is configured and the OS data directory is unknown.
    pub fn resolved_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let mut path = dirs::data_dir().context("unable to determine OS data directory")?;
        path.push("robias");
        path.push("models");
        Ok(path)
    }
}

/// Feature-hashing setup shared by the sentence- and document-level linear
/// models. Opaque to the ensemble; handed to the linear oracle loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    #[serde(default = "default_n_features")]
    pub n_features: usize,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: [usize; 2],
    #[serde(default = "default_true")]
    pub binary: bool,
    #[serde(default = "default_true")]
    pub non_negative: bool,
    #[serde(default)]
    pub norm: Option<String>,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            n_features: default_n_features(),
            ngram_range: default_ngram_range(),
            binary: default_true(),
            non_negative: default_true(),
            norm: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold {0} is outside [0, 1]")]
    Threshold(f64),
    #[error("fusion weights {0:?} must be finite and non-negative")]
    FusionWeights([f64; 2]),
    #[error("top_k must be at least 1 when set")]
    ZeroTopK,
    #[error("snippet_width must be at least 1")]
    ZeroSnippetWidth,
    #[error("domain {0} listed more than once")]
    DuplicateDomain(Domain),
    #[error("neural domain {0} is not in the scored domain list")]
    UnknownNeuralDomain(Domain),
    #[error("ngram range {0:?} is not a valid 1-based inclusive range")]
    NgramRange([usize; 2]),
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ConfigInvalid
    }
}

impl EnsembleConfig {
    /// Check value ranges and domain list consistency.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if self
            .fusion_weights
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(ConfigError::FusionWeights(self.fusion_weights));
        }
        if self.top_k == Some(0) {
            return Err(ConfigError::ZeroTopK);
        }
        if self.snippet_width == 0 {
            return Err(ConfigError::ZeroSnippetWidth);
        }

        let mut seen = HashSet::new();
        for domain in &self.domains {
            if !seen.insert(*domain) {
                return Err(ConfigError::DuplicateDomain(*domain));
            }
        }
        if let Some(stray) = self.neural_domains.iter().find(|d| !seen.contains(*d)) {
            return Err(ConfigError::UnknownNeuralDomain(*stray));
        }
        Ok(())
    }
}

impl HashingConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::NgramRange`] for an empty or zero-based range.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        let [lo, hi] = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ConfigError::NgramRange(self.ngram_range));
        }
        Ok(())
    }
}

impl RobiasConfig {
    /// # Errors
    ///
    /// Returns the first invalid section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ensemble.validate()?;
        self.hashing.validate()
    }
}

/// Load `path`, falling back to defaults when the file does not exist.
///
/// # Errors
///
/// Fails on unreadable files, TOML syntax errors and out-of-range values.
pub fn load_config(path: &Path) -> Result<RobiasConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(RobiasConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<RobiasConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid values in {}", path.display()))?;

    Ok(config)
}

const fn default_true() -> bool {
    true
}

const fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

const fn default_snippet_width() -> usize {
    DEFAULT_SNIPPET_WIDTH
}

const fn default_fusion_weights() -> [f64; 2] {
    [1.0, 1.0]
}

fn default_domains() -> Vec<Domain> {
    Domain::ALL.to_vec()
}

const fn default_n_features() -> usize {
    1 << 26
}

const fn default_ngram_range() -> [usize; 2] {
    [1, 2]
}
