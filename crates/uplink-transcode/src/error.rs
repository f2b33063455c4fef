//! # Design
//!
//! - A transform failure only affects the file being transformed.
//! - Messages stay constant; the input path and exit code live in fields.

use std::error::Error;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors raised while transforming a file.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The transcoder could not be run.
    #[error("transcoder could not be started")]
    Spawn {
        /// File being transformed.
        input: PathBuf,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The transcoder ran but did not exit cleanly.
    #[error("transcoder exited unsuccessfully")]
    Failed {
        /// File being transformed.
        input: PathBuf,
        /// Exit code; `None` when terminated by a signal.
        code: Option<i32>,
    },
    /// The transcoder reported success but left no output behind.
    #[error("transcoder produced no output")]
    MissingOutput {
        /// File being transformed.
        input: PathBuf,
        /// Expected output location.
        output: PathBuf,
    },
}

impl TransformError {
    pub(crate) fn spawn(input: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        Self::Spawn {
            input: input.into(),
            source: source.into(),
        }
    }

    /// One-line description including exit code or source, for outcome details.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Spawn { source, .. } => format!("transform failed: {self}: {source}"),
            Self::Failed {
                code: Some(code), ..
            } => format!("transform failed: {self} (exit code {code})"),
            Self::Failed { code: None, .. } => {
                format!("transform failed: {self} (terminated by signal)")
            }
            Self::MissingOutput { output, .. } => {
                format!("transform failed: {self} ({})", output.display())
            }
        }
    }
}
