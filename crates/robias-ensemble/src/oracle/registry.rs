//! Per-domain oracle registry, built once at startup.

use super::artifacts::{ArtifactError, ArtifactStore, LinearArtifacts, NeuralArtifacts};
use super::{OracleRole, ScoringOracle};
use robias_core::{Domain, ErrorCode, RobiasConfig};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Turns resolved artifacts into live oracles.
pub trait OracleLoader {
    /// # Errors
    ///
    /// Deserialization or runtime initialization failures.
    fn load_linear(&self, artifacts: &LinearArtifacts) -> anyhow::Result<Arc<dyn ScoringOracle>>;

    /// # Errors
    ///
    /// Deserialization or runtime initialization failures.
    fn load_neural(&self, artifacts: &NeuralArtifacts) -> anyhow::Result<Arc<dyn ScoringOracle>>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("failed to load {role} oracle{}: {source:#}", domain_suffix(.domain.as_ref()))]
    Load {
        role: OracleRole,
        domain: Option<Domain>,
        source: anyhow::Error,
    },

    #[error("oracle registered as {expected} reports role {found}")]
    RoleMismatch {
        expected: OracleRole,
        found: OracleRole,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] robias_core::ConfigError),

    #[error("cannot resolve artifacts root: {0}")]
    Root(anyhow::Error),
}

impl RegistryError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Artifact(ArtifactError::ChecksumMismatch { .. }) => ErrorCode::ArtifactChecksumMismatch,
            Self::Artifact(ArtifactError::Manifest { .. }) => ErrorCode::ConfigParseError,
            Self::Artifact(_) | Self::Root(_) => ErrorCode::ArtifactMissing,
            Self::Load { .. } | Self::RoleMismatch { .. } => ErrorCode::OracleLoadFailed,
            Self::Config(_) => ErrorCode::ConfigInvalid,
        }
    }
}

/// Linear oracle for every domain plus neural oracles for a subset.
#[derive(Clone)]
pub struct OracleRegistry {
    linear: Arc<dyn ScoringOracle>,
    neural: BTreeMap<Domain, Arc<dyn ScoringOracle>>,
}

impl OracleRegistry {
    /// A registry with only the linear oracle.
    ///
    /// # Errors
    ///
    /// [`RegistryError::RoleMismatch`] if `linear` is not a linear oracle.
    pub fn new(linear: Arc<dyn ScoringOracle>) -> Result<Self, RegistryError> {
        check_role(linear.as_ref(), OracleRole::Linear)?;
        Ok(Self {
            linear,
            neural: BTreeMap::new(),
        })
    }

    /// Register (or replace) the neural oracle for `domain`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::RoleMismatch`] if `oracle` is not a neural oracle.
    pub fn with_neural(mut self, domain: Domain, oracle: Arc<dyn ScoringOracle>) -> Result<Self, RegistryError> {
        check_role(oracle.as_ref(), OracleRole::Neural)?;
        self.neural.insert(domain, oracle);
        Ok(self)
    }

    /// Resolve artifacts and load every oracle named by `config`.
    ///
    /// Any failure is fatal: a partially loaded registry is never returned.
    ///
    /// # Errors
    ///
    /// Invalid config, missing or corrupt artifacts, loader failures.
    pub fn load(config: &RobiasConfig, loader: &dyn OracleLoader) -> Result<Self, RegistryError> {
        config.validate()?;
        let root = config.artifacts.resolved_root().map_err(RegistryError::Root)?;
        let store = ArtifactStore::open(root)?;

        let linear_artifacts = store.linear(&config.hashing)?;
        let linear = loader
            .load_linear(&linear_artifacts)
            .map_err(|source| RegistryError::Load {
                role: OracleRole::Linear,
                domain: None,
                source,
            })?;
        let mut registry = Self::new(linear)?;

        for &domain in &config.ensemble.neural_domains {
            let artifacts = store.neural(domain)?;
            let oracle = loader
                .load_neural(&artifacts)
                .map_err(|source| RegistryError::Load {
                    role: OracleRole::Neural,
                    domain: Some(domain),
                    source,
                })?;
            registry = registry.with_neural(domain, oracle)?;
        }

        info!(
            root = %store.root().display(),
            neural_domains = registry.neural.len(),
            "oracle registry loaded"
        );
        Ok(registry)
    }

    #[must_use]
    pub fn linear(&self) -> &dyn ScoringOracle {
        self.linear.as_ref()
    }

    #[must_use]
    pub fn neural(&self, domain: Domain) -> Option<&dyn ScoringOracle> {
        self.neural.get(&domain).map(|oracle| oracle.as_ref())
    }

    /// Domains with a neural oracle, in canonical order.
    #[must_use]
    pub fn neural_domains(&self) -> Vec<Domain> {
        self.neural.keys().copied().collect()
    }
}

impl std::fmt::Debug for OracleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleRegistry")
            .field("neural_domains", &self.neural_domains())
            .finish_non_exhaustive()
    }
}

fn domain_suffix(domain: Option<&Domain>) -> String {
    domain.map(|d| format!(" for {d}")).unwrap_or_default()
}

fn check_role(oracle: &dyn ScoringOracle, expected: OracleRole) -> Result<(), RegistryError> {
    let found = oracle.role();
    if found == expected {
        Ok(())
    } else {
        Err(RegistryError::RoleMismatch { expected, found })
    }
}
