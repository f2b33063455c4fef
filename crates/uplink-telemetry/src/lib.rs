#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Logging setup shared by the uplink binaries.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (process span),
//! `error.rs`.

pub mod context;
pub mod error;
pub mod init;

pub use context::{GlobalContextGuard, run_id};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
