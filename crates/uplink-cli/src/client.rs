//! Shared client utilities and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use uplink_client::{ClientError, Session, build_http_client};
use uplink_pipeline::PipelineError;
use url::Url;

use crate::cli::{Cli, OutputFormat};

/// CLI-level error type separating bad input, operational failures, and
/// batches where only some files made it.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    PartialFailure { failed: usize, total: usize },
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) fn missing_token() -> Self {
        Self::validation(
            "session token is required (pass --token, set UPLINK_TOKEN, or run `uplink login`)",
        )
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::PartialFailure { .. } => 1,
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::PartialFailure { failed, total } => {
                format!("{failed} of {total} files failed to upload")
            }
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Configuration { field, reason } => {
                Self::validation(format!("{field}: {reason}"))
            }
            PipelineError::PathNotFound { path } => {
                Self::validation(format!("path not found: {}", path.display()))
            }
            other => Self::failure(other),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidInput { field, reason } => {
                Self::validation(format!("{field}: {reason}"))
            }
            other => Self::failure(other),
        }
    }
}

/// Dependencies constructed from CLI options.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
}

impl CliDependencies {
    /// Construct the HTTP client shared by every command.
    pub(crate) fn from_cli(cli: &Cli) -> CliResult<Self> {
        if cli.connect_timeout == 0 {
            return Err(CliError::validation(
                "connect timeout must be at least one second",
            ));
        }
        let client = build_http_client(Duration::from_secs(cli.connect_timeout))
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err:#}")))?;
        Ok(Self { client })
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) token: Option<String>,
    pub(crate) output: OutputFormat,
    pub(crate) ffmpeg: PathBuf,
    pub(crate) swarm_client: PathBuf,
    pub(crate) cancel: CancellationToken,
}

impl AppContext {
    /// Session built from the configured token.
    pub(crate) fn session(&self) -> CliResult<Session> {
        let token = self
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(CliError::missing_token)?;
        Ok(Session::from_token(self.base_url.clone(), token)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::error::Error;

    pub(crate) fn context(base_url: Url, token: Option<&str>) -> AppContext {
        AppContext {
            client: Client::new(),
            base_url,
            token: token.map(str::to_string),
            output: OutputFormat::Json,
            ffmpeg: PathBuf::from("ffmpeg"),
            swarm_client: PathBuf::from("aria2c"),
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::PartialFailure { failed: 1, total: 3 }.exit_code(), 1);
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
    }

    #[test]
    fn partial_failure_message_counts_files() {
        let err = CliError::PartialFailure { failed: 2, total: 5 };
        assert_eq!(err.display_message(), "2 of 5 files failed to upload");
    }

    #[test]
    fn pipeline_validation_errors_map_to_validation() {
        let err = CliError::from(PipelineError::PathNotFound {
            path: PathBuf::from("/missing"),
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "path not found: /missing");

        let err = CliError::from(PipelineError::Configuration {
            field: "destination_folder",
            reason: "must not be empty",
        });
        assert_eq!(err.display_message(), "destination_folder: must not be empty");
    }

    #[test]
    fn authentication_errors_are_failures() {
        let err = CliError::from(ClientError::AuthenticationFailed {
            reason: "login rejected",
            status: Some(401),
        });
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("authentication failed"));
    }

    #[test]
    fn session_requires_token() -> Result<(), Box<dyn Error>> {
        let base: Url = "http://localhost".parse()?;
        let err = match context(base.clone(), None).session() {
            Ok(_) => return Err("expected missing token".into()),
            Err(err) => err,
        };
        assert_eq!(err.exit_code(), 2);

        let session = context(base, Some("abc")).session()?;
        assert_eq!(session.token(), "abc");
        Ok(())
    }
}
