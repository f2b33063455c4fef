//! Core upload domain types and DTOs shared across the workspace.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

fn push_tag(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_string());
    }
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    let mut tags = Vec::with_capacity(raw.len());
    for tag in &raw {
        push_tag(&mut tags, tag);
    }
    Ok(tags)
}

/// File extension identifying a swarm manifest.
pub const MANIFEST_SUFFIX: &str = "torrent";

/// Optional transformation applied to a file before it is uploaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformHint {
    /// Upload files unchanged.
    #[default]
    None,
    /// Re-encode video files with HEVC before uploading them.
    VideoCompress,
}

/// What happens to on-disk files once a transformed file has been uploaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformCleanup {
    /// Leave both the original and the transcoded file in place.
    #[default]
    Keep,
    /// Delete the original source once its transcoded copy was uploaded.
    RemoveOriginal,
    /// Delete the transcoded copy once it was uploaded.
    RemoveTranscoded,
}

/// A single upload invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// File, directory, or swarm manifest to upload.
    pub source_path: PathBuf,
    /// Remote folder that receives the files.
    pub destination_folder: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    tags: Vec<String>,
    /// Optional free-form description attached to every file.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional transformation applied to eligible files.
    #[serde(default)]
    pub transform_hint: TransformHint,
    /// Cleanup policy applied after a transformed upload succeeded.
    #[serde(default)]
    pub cleanup: TransformCleanup,
    /// Directory that receives content acquired from a swarm manifest.
    #[serde(default)]
    pub acquisition_work_dir: Option<PathBuf>,
}

impl UploadRequest {
    /// Build a request with no tags, no transform, and no acquisition directory.
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>, destination_folder: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            destination_folder: destination_folder.into(),
            tags: Vec::new(),
            description: None,
            transform_hint: TransformHint::None,
            cleanup: TransformCleanup::Keep,
            acquisition_work_dir: None,
        }
    }

    /// Add tags, keeping the first occurrence of each and dropping blanks.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            push_tag(&mut self.tags, tag.as_ref());
        }
        self
    }

    /// Attach a description sent alongside every file.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Select the transformation applied to eligible files.
    #[must_use]
    pub const fn with_transform(mut self, hint: TransformHint) -> Self {
        self.transform_hint = hint;
        self
    }

    /// Select the cleanup policy for transformed files.
    #[must_use]
    pub const fn with_cleanup(mut self, cleanup: TransformCleanup) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Set the directory used for swarm acquisition.
    #[must_use]
    pub fn with_acquisition_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.acquisition_work_dir = Some(dir.into());
        self
    }

    /// Tags in insertion order, without duplicates.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether the source names a swarm manifest rather than local content.
    #[must_use]
    pub fn is_manifest(&self) -> bool {
        is_manifest_path(&self.source_path)
    }

    /// Metadata sent with each file of this request.
    #[must_use]
    pub fn target(&self) -> UploadTarget {
        UploadTarget {
            destination_folder: self.destination_folder.clone(),
            tags: self.tags.clone(),
            description: self.description.clone(),
        }
    }
}

/// Returns `true` when the path carries the swarm manifest suffix.
#[must_use]
pub fn is_manifest_path(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MANIFEST_SUFFIX))
}

/// Parses a comma-separated tag string into trimmed, non-empty tags.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remote placement and labels applied to an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    /// Remote folder that receives the file.
    pub destination_folder: String,
    /// Ordered tags attached to the file.
    pub tags: Vec<String>,
    /// Optional description attached to the file.
    pub description: Option<String>,
}

impl UploadTarget {
    /// Tags in the comma-joined wire form.
    #[must_use]
    pub fn joined_tags(&self) -> String {
        self.tags.join(",")
    }
}

/// A local file ready for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFile {
    /// Location of the file on disk.
    pub absolute_path: PathBuf,
    /// MIME type determined from the file content.
    pub mime_type: String,
    /// Name the file is stored under, relative to the destination folder.
    pub upload_name: String,
}

impl ResolvedFile {
    /// Construct a resolved file.
    #[must_use]
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        upload_name: impl Into<String>,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            mime_type: mime_type.into(),
            upload_name: upload_name.into(),
        }
    }

    /// Whether the content was recognised as video.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video")
    }
}

/// Byte-level progress of a single transfer or acquisition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Bytes moved so far.
    pub bytes_transferred: u64,
    /// Bytes expected in total; zero when unknown.
    pub total_bytes: u64,
    /// Average rate in bytes per second.
    pub rate_estimate: f64,
}

impl TransferProgress {
    /// Build a progress sample, deriving the rate from the elapsed time.
    #[must_use]
    pub fn observe(bytes_transferred: u64, total_bytes: u64, elapsed: Duration) -> Self {
        let seconds = elapsed.as_secs_f64();
        let rate_estimate = if seconds > 0.0 {
            to_f64(bytes_transferred) / seconds
        } else {
            0.0
        };
        Self {
            bytes_transferred,
            total_bytes,
            rate_estimate,
        }
    }

    /// Calculate the completion percentage (0-100).
    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            (to_f64(self.bytes_transferred) / to_f64(self.total_bytes)) * 100.0
        }
    }
}

const fn to_f64(value: u64) -> f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "u64 to f64 conversion is required for user-facing rate reporting"
    )]
    {
        value as f64
    }
}

/// Final state of one file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The backend accepted the file.
    Uploaded,
    /// The file could not be transformed or transferred.
    Failed,
}

impl OutcomeStatus {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }
}

/// Result of processing one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// File that was processed (the transcoded copy when a transform ran).
    pub file: ResolvedFile,
    /// Whether the upload succeeded.
    pub status: OutcomeStatus,
    /// HTTP status returned by the backend, when a response was received.
    pub http_status: Option<u16>,
    /// Human-readable failure reason.
    pub error_detail: Option<String>,
    /// When the outcome was recorded.
    pub completed_at: DateTime<Utc>,
}

impl FileOutcome {
    /// Outcome for a file the backend accepted.
    #[must_use]
    pub fn uploaded(file: ResolvedFile, http_status: u16) -> Self {
        Self {
            file,
            status: OutcomeStatus::Uploaded,
            http_status: Some(http_status),
            error_detail: None,
            completed_at: Utc::now(),
        }
    }

    /// Outcome for a file that failed at any stage.
    #[must_use]
    pub fn failed(file: ResolvedFile, http_status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            file,
            status: OutcomeStatus::Failed,
            http_status,
            error_detail: Some(detail.into()),
            completed_at: Utc::now(),
        }
    }

    /// Whether the backend accepted the file.
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        self.status == OutcomeStatus::Uploaded
    }
}

/// Ordered outcomes of one upload request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    outcomes: Vec<FileOutcome>,
}

impl BatchResult {
    /// Append the outcome of the next file.
    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes in processing order.
    #[must_use]
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Number of processed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no file was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of files the backend accepted.
    #[must_use]
    pub fn uploaded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_uploaded()).count()
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.len() - self.uploaded_count()
    }

    /// Whether any file failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_uploaded())
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a FileOutcome;
    type IntoIter = std::slice::Iter<'a, FileOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Lifecycle reported by a swarm engine for one acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcquisitionState {
    /// Waiting for the engine to start the job.
    Queued,
    /// Checking already-present data against the manifest.
    CheckingExisting,
    /// Resolving metadata from peers.
    FetchingMetadata,
    /// Reserving disk space before the transfer.
    Allocating,
    /// Payload data is being transferred.
    Downloading,
    /// Verifying downloaded pieces.
    Verifying,
    /// The payload is complete on disk.
    Complete,
    /// The engine gave up on the job.
    Failed {
        /// Engine-provided reason.
        message: String,
    },
}

impl AcquisitionState {
    /// Stable lowercase label used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::CheckingExisting => "checking_existing",
            Self::FetchingMetadata => "fetching_metadata",
            Self::Allocating => "allocating",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Complete => "complete",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Identifies an acquisition job inside a swarm engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmHandle {
    /// Engine-scoped job identifier.
    pub id: Uuid,
    /// Manifest the job was created from.
    pub manifest: PathBuf,
    /// Directory receiving the payload.
    pub destination: PathBuf,
}

/// Polled status of an acquisition job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmStatus {
    /// Current lifecycle state.
    pub state: AcquisitionState,
    /// Payload bytes present so far.
    pub bytes_done: u64,
    /// Payload size; zero while unknown.
    pub bytes_total: u64,
    /// Current download rate in bytes per second.
    pub download_rate: f64,
    /// Whether the engine holds the full payload and would seed it.
    pub is_seed: bool,
    /// Payload location once known, relative to the destination directory.
    /// Never empty; an engine always names the file or directory it produced.
    pub payload: Option<PathBuf>,
}

impl SwarmStatus {
    /// Status of a job that has not started yet.
    #[must_use]
    pub const fn queued() -> Self {
        Self {
            state: AcquisitionState::Queued,
            bytes_done: 0,
            bytes_total: 0,
            download_rate: 0.0,
            is_seed: false,
            payload: None,
        }
    }

    /// Whether the payload is fully available.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_seed || self.state == AcquisitionState::Complete
    }

    /// Progress sample derived from this status.
    #[must_use]
    pub const fn progress(&self) -> TransferProgress {
        TransferProgress {
            bytes_transferred: self.bytes_done,
            total_bytes: self.bytes_total,
            rate_estimate: self.download_rate,
        }
    }
}
