#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Engine-agnostic upload domain types and collaborator traits.
//!
//! Layout: `model/` (requests, files, progress, outcomes, swarm status),
//! `service/` (traits implemented by the swarm, transcode, and client crates).

pub mod model;
pub mod service;

pub use model::{
    AcquisitionState, BatchResult, FileOutcome, MANIFEST_SUFFIX, OutcomeStatus, ResolvedFile,
    SwarmHandle, SwarmStatus, TransferProgress, TransformCleanup, TransformHint, UploadRequest,
    UploadTarget, is_manifest_path, parse_tags,
};
pub use service::{
    ProgressSink, SwarmEngine, TranscodeExit, Transcoder, Uploader, noop_progress,
};
