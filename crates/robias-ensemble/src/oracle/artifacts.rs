//! Model artifact resolution and integrity checks.
//!
//! Layout under the artifacts root:
//!
//! ```text
//! manifest.toml                      optional: [checksums] "<rel path>" = "<sha256 hex>"
//! linear/sentence_level.npz
//! linear/document_level.npz
//! neural/<CODE>/preprocessor
//! neural/<CODE>/architecture.json
//! neural/<CODE>/weights.bin
//! ```
//!
//! Deserializing the files is the oracle loader's job; this module only
//! guarantees that every file exists and, when the manifest lists a
//! checksum for it, that the bytes match.

use robias_core::{Domain, HashingConfig};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const MANIFEST_FILENAME: &str = "manifest.toml";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifacts root {0} does not exist")]
    RootMissing(PathBuf),

    #[error("model artifact {0} not found")]
    Missing(PathBuf),

    #[error("model artifact {path} failed SHA256 verification (expected {expected}, found {found})")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("failed to parse {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("artifact I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    checksums: BTreeMap<String, String>,
}

/// Files backing one domain's neural rationale ranker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuralArtifacts {
    pub domain: Domain,
    pub preprocessor: PathBuf,
    pub architecture: PathBuf,
    pub weights: PathBuf,
}

/// Files backing the joint linear oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearArtifacts {
    pub sentence_params: PathBuf,
    pub document_params: PathBuf,
    pub hashing: HashingConfig,
}

/// A verified artifacts root.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    checksums: BTreeMap<String, String>,
}

impl ArtifactStore {
    /// Open `root` and read its checksum manifest if present.
    ///
    /// # Errors
    ///
    /// Missing root, unreadable or malformed manifest.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ArtifactError::RootMissing(root));
        }

        let manifest_path = root.join(MANIFEST_FILENAME);
        let manifest = if manifest_path.exists() {
            let content = fs::read_to_string(&manifest_path).map_err(|source| ArtifactError::Io {
                path: manifest_path.clone(),
                source,
            })?;
            toml::from_str::<Manifest>(&content).map_err(|source| ArtifactError::Manifest {
                path: manifest_path.clone(),
                source,
            })?
        } else {
            Manifest::default()
        };

        debug!(
            root = %root.display(),
            checksums = manifest.checksums.len(),
            "opened artifact store"
        );

        Ok(Self {
            root,
            checksums: manifest.checksums,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the linear oracle's parameter files.
    ///
    /// # Errors
    ///
    /// Missing files or checksum mismatches.
    pub fn linear(&self, hashing: &HashingConfig) -> Result<LinearArtifacts, ArtifactError> {
        Ok(LinearArtifacts {
            sentence_params: self.resolve("linear/sentence_level.npz")?,
            document_params: self.resolve("linear/document_level.npz")?,
            hashing: hashing.clone(),
        })
    }

    /// Resolve one domain's neural ranker files.
    ///
    /// # Errors
    ///
    /// Missing files or checksum mismatches.
    pub fn neural(&self, domain: Domain) -> Result<NeuralArtifacts, ArtifactError> {
        let dir = format!("neural/{}", domain.code());
        Ok(NeuralArtifacts {
            domain,
            preprocessor: self.resolve(&format!("{dir}/preprocessor"))?,
            architecture: self.resolve(&format!("{dir}/architecture.json"))?,
            weights: self.resolve(&format!("{dir}/weights.bin"))?,
        })
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, ArtifactError> {
        let path = self.root.join(relative);
        if !path.is_file() {
            return Err(ArtifactError::Missing(path));
        }

        if let Some(expected) = self.checksums.get(relative) {
            let bytes = fs::read(&path).map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;
            let found = sha256_hex(&bytes);
            if !found.eq_ignore_ascii_case(expected) {
                return Err(ArtifactError::ChecksumMismatch {
                    path,
                    expected: expected.clone(),
                    found,
                });
            }
        }

        Ok(path)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
