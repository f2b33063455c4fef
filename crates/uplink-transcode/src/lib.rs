#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Optional re-encoding of files before upload.
//! Layout: adapter.rs (hint handling and output naming), ffmpeg.rs (process-backed transcoder), error.rs.

pub mod adapter;
pub mod error;
pub mod ffmpeg;

pub use adapter::{TRANSCODED_EXTENSION, TRANSCODED_MIME, TransformAdapter, transcoded_name, transcoded_path};
pub use error::{TransformError, TransformResult};
pub use ffmpeg::{DEFAULT_FFMPEG_PROGRAM, FfmpegTranscoder};
