//! # Design
//!
//! - Only request-fatal conditions live here; per-file failures are recorded
//!   as outcomes instead.
//! - Messages stay constant; the offending field or path is carried alongside.

use std::path::PathBuf;

use thiserror::Error;
use uplink_fsops::FsOpsError;
use uplink_swarm::AcquisitionError;

/// Result alias for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort an upload request before or instead of a batch result.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request or pipeline wiring is unusable.
    #[error("invalid upload configuration")]
    Configuration {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// The upload source does not exist.
    #[error("path not found")]
    PathNotFound {
        /// Requested source.
        path: PathBuf,
    },
    /// The upload source could not be expanded into files.
    #[error("upload source could not be resolved")]
    Resolve {
        /// Requested source.
        path: PathBuf,
        /// Underlying filesystem failure.
        source: FsOpsError,
    },
    /// Swarm acquisition failed, timed out, or was cancelled.
    #[error("content acquisition failed")]
    Acquisition {
        /// Underlying acquisition failure.
        #[source]
        source: AcquisitionError,
    },
}

impl PipelineError {
    pub(crate) const fn configuration(field: &'static str, reason: &'static str) -> Self {
        Self::Configuration { field, reason }
    }

    pub(crate) fn resolve(path: impl Into<PathBuf>, source: FsOpsError) -> Self {
        match source {
            FsOpsError::PathNotFound { path } => Self::PathNotFound { path },
            source => Self::Resolve {
                path: path.into(),
                source,
            },
        }
    }

    /// Whether the error stems from caller input rather than the environment.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::PathNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn missing_source_maps_to_path_not_found() {
        let err = PipelineError::resolve(
            "/srv/missing",
            FsOpsError::PathNotFound {
                path: PathBuf::from("/srv/missing"),
            },
        );
        assert!(matches!(err, PipelineError::PathNotFound { ref path } if path.ends_with("missing")));
        assert!(err.is_validation());
    }

    #[test]
    fn acquisition_keeps_its_source() {
        let err = PipelineError::Acquisition {
            source: AcquisitionError::Cancelled {
                manifest: PathBuf::from("pack.torrent"),
            },
        };
        assert!(!err.is_validation());
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("acquisition cancelled".to_string())
        );
    }
}
