#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Shared test helpers used across the pipeline crates.
//! Layout: fixtures.rs (on-disk sample files), mocks.rs (fake collaborators).

pub mod fixtures;
pub mod mocks;

pub use fixtures::{mp4_bytes, pdf_bytes, write_file, write_tree};
pub use mocks::{FakeSwarmEngine, RecordedUpload, RecordingUploader, ScriptedTranscoder};
