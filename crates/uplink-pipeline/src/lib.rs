#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Upload pipeline orchestration: validate, acquire, resolve, then per file
//! sniff, transform, upload, and record.
//!
//! Layout: `orchestrator.rs` (the sequential worker), `events.rs` (progress
//! notifications for renderers), `error.rs` (request-fatal errors).

pub mod error;
pub mod events;
pub mod orchestrator;

pub use error::{PipelineError, PipelineResult};
pub use events::PipelineEvent;
pub use orchestrator::{CANCELLED_DETAIL, UploadPipeline};
