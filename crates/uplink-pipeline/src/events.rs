//! Notifications emitted while a pipeline runs.

use serde::Serialize;
use uplink_core::{FileOutcome, ResolvedFile, TransferProgress};

/// Progress notification for renderers; delivery is best effort.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Swarm acquisition made progress.
    AcquisitionProgress {
        /// Latest sample.
        progress: TransferProgress,
    },
    /// Acquisition finished and the source was resolved into files.
    Resolved {
        /// Number of files that will be processed.
        total: usize,
    },
    /// Work on a file began.
    FileStarted {
        /// Zero-based position in the batch.
        index: usize,
        /// Files in the batch.
        total: usize,
        /// File as resolved from disk.
        file: ResolvedFile,
    },
    /// Bytes of the current file reached the transfer.
    TransferProgress {
        /// Zero-based position in the batch.
        index: usize,
        /// Latest sample.
        progress: TransferProgress,
    },
    /// A file's outcome was recorded.
    FileFinished {
        /// Zero-based position in the batch.
        index: usize,
        /// Recorded outcome.
        outcome: FileOutcome,
    },
}
