#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Swarm acquisition: waits for a peer-swarm engine to materialise a
//! manifest's content on disk.
//!
//! Layout: `adapter.rs` (cancellable, optionally time-bounded wait),
//! `process.rs` (engine backed by an external swarm client process),
//! `error.rs` (acquisition error taxonomy).

/// Acquisition adapter driving any [`uplink_core::SwarmEngine`].
pub mod adapter;
/// Acquisition error types.
pub mod error;
/// Swarm engine backed by an external client process.
pub mod process;

pub use adapter::{AcquisitionAdapter, DEFAULT_POLL_INTERVAL};
pub use error::{AcquisitionError, AcquisitionResult};
pub use process::{DEFAULT_SWARM_ARGS, DEFAULT_SWARM_PROGRAM, ProcessSwarmEngine};
