#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! HTTP client for the remote file backend.
//!
//! Layout: `session.rs` (credential, login, endpoint joining), `upload.rs`
//! (streamed multipart uploads), `error.rs`.

pub mod error;
pub mod session;
pub mod upload;

use std::time::Duration;

use reqwest::Client;

pub use error::{ClientError, ClientResult};
pub use session::{LOGIN_PATH, SESSION_COOKIE, Session, endpoint, login};
pub use upload::{HttpUploader, UPLOAD_PATH};

/// Connect timeout applied when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by login and uploads.
///
/// Only connection establishment is bounded; transfers of large files are
/// allowed to take as long as they need.
///
/// # Errors
///
/// Returns [`ClientError::Build`] when the TLS backend cannot be initialised.
pub fn build_http_client(connect_timeout: Duration) -> ClientResult<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(concat!("uplink/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| ClientError::Build { source })
}
