//! Local filesystem helpers for the upload pipeline: source resolution and
//! content-based MIME inspection.
#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod mime;
pub mod resolver;

pub use error::{FsOpsError, FsOpsResult};
pub use mime::{FALLBACK_MIME, sniff_bytes, sniff_mime};
pub use resolver::{resolve, upload_name};
