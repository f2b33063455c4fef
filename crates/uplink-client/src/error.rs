//! # Design
//!
//! - Constant messages; URLs, statuses, and paths live in fields.
//! - Authentication problems are a distinct variant so callers can tell a bad
//!   credential from a broken network.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced by the backend client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend refused the credentials or answered without a token.
    #[error("authentication failed")]
    AuthenticationFailed {
        /// Static description of what went wrong.
        reason: &'static str,
        /// HTTP status returned by the backend, when one was received.
        status: Option<u16>,
    },
    /// A request could not be sent or its response could not be read.
    #[error("http request failed")]
    Http {
        /// Operation identifier.
        operation: &'static str,
        /// Target URL.
        url: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("http client could not be built")]
    Build {
        /// Underlying builder error.
        source: reqwest::Error,
    },
    /// A URL could not be formed.
    #[error("invalid url")]
    InvalidUrl {
        /// Offending input.
        value: String,
        /// Parse failure.
        source: url::ParseError,
    },
    /// A caller-supplied value is unusable.
    #[error("client invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// Local file access failed.
    #[error("client io failure")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl ClientError {
    pub(crate) fn http(operation: &'static str, url: &url::Url, source: reqwest::Error) -> Self {
        Self::Http {
            operation,
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn auth(reason: &'static str, status: Option<u16>) -> Self {
        Self::AuthenticationFailed { reason, status }
    }
}
