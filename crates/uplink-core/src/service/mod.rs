//! Collaborator traits implemented by the swarm, transcode, and client adapters.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{FileOutcome, ResolvedFile, SwarmHandle, SwarmStatus, TransferProgress, UploadTarget};

/// Callback receiving progress samples while a transfer runs.
pub type ProgressSink = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// Sink that discards every sample.
#[must_use]
pub fn noop_progress() -> ProgressSink {
    Arc::new(|_| {})
}

/// External peer-swarm engine that materialises manifest content on disk.
#[async_trait]
pub trait SwarmEngine: Send + Sync {
    /// Start acquiring the manifest's content into `destination`.
    async fn add(&self, manifest: &Path, destination: &Path) -> anyhow::Result<SwarmHandle>;

    /// Poll the current status of a job.
    async fn status(&self, handle: &SwarmHandle) -> anyhow::Result<SwarmStatus>;

    /// Stop a job that is no longer wanted; default implementation does nothing.
    async fn abandon(&self, handle: &SwarmHandle) -> anyhow::Result<()> {
        let _ = handle;
        Ok(())
    }
}

/// Exit status reported by an external transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeExit {
    /// Process exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl TranscodeExit {
    /// Whether the transcoder exited with code zero.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// External process that re-encodes `input` into `output`.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run the transcoder to completion.
    async fn transcode(&self, input: &Path, output: &Path) -> anyhow::Result<TranscodeExit>;
}

/// Transfers one file to the remote backend.
///
/// Implementations never fail the call itself: transport and server errors are
/// captured in the returned [`FileOutcome`].
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Stream `file` to the backend, reporting cumulative bytes to `progress`.
    async fn upload(
        &self,
        file: &ResolvedFile,
        target: &UploadTarget,
        progress: ProgressSink,
    ) -> FileOutcome;
}
