#![forbid(unsafe_code)]
//! robias-core library.
//!
//! Shared data model for the risk-of-bias ensemble: segmented documents,
//! bias domains, per-domain score records, error codes and configuration.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for library errors, `anyhow::Result` at
//!   I/O boundaries such as config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod score;

pub use config::{ArtifactsConfig, ConfigError, EnsembleConfig, HashingConfig, RobiasConfig, load_config};
pub use document::{Document, DocumentError, Sentence};
pub use domain::{Domain, UnknownDomain};
pub use error::ErrorCode;
pub use score::{DEFAULT_THRESHOLD, Rationale, RiskLabel, ScoreResult};
