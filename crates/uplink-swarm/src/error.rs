//! # Design
//!
//! - Every acquisition failure is fatal to the request that asked for it.
//! - Keep error messages constant; store the manifest and timings in fields.
//! - Engine failures keep their source chain for `{:#}` rendering.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result alias for acquisition operations.
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Errors raised while acquiring swarm content.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The engine rejected a call.
    #[error("swarm engine operation failed")]
    Engine {
        /// Operation identifier.
        operation: &'static str,
        /// Manifest being acquired.
        manifest: PathBuf,
        /// Underlying engine failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The engine reported that the job failed.
    #[error("acquisition failed")]
    Failed {
        /// Manifest being acquired.
        manifest: PathBuf,
        /// Engine-provided reason.
        message: String,
    },
    /// The engine reported completion without a payload location.
    #[error("acquisition completed without a payload")]
    MissingPayload {
        /// Manifest being acquired.
        manifest: PathBuf,
    },
    /// The configured wait bound elapsed.
    #[error("acquisition timed out")]
    Timeout {
        /// Manifest being acquired.
        manifest: PathBuf,
        /// How long the adapter waited.
        waited: Duration,
    },
    /// The caller cancelled the wait.
    #[error("acquisition cancelled")]
    Cancelled {
        /// Manifest being acquired.
        manifest: PathBuf,
    },
}

impl AcquisitionError {
    pub(crate) fn engine(
        operation: &'static str,
        manifest: impl Into<PathBuf>,
        source: anyhow::Error,
    ) -> Self {
        Self::Engine {
            operation,
            manifest: manifest.into(),
            source: source.into(),
        }
    }
}
