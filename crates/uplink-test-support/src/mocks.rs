//! In-memory fakes for the swarm engine, transcoder, and uploader seams.

use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use uplink_core::{
    AcquisitionState, FileOutcome, ProgressSink, ResolvedFile, SwarmEngine, SwarmHandle,
    SwarmStatus, TranscodeExit, Transcoder, TransferProgress, UploadTarget, Uploader,
};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Swarm engine replaying a fixed sequence of statuses.
///
/// Each poll pops the next status; the last one repeats forever.
pub struct FakeSwarmEngine {
    script: Mutex<VecDeque<SwarmStatus>>,
    deliveries: Vec<(PathBuf, Vec<u8>)>,
    reject_add: Option<String>,
    added: Mutex<Vec<PathBuf>>,
    abandoned: AtomicUsize,
}

impl FakeSwarmEngine {
    /// Engine that reports `statuses` in order.
    #[must_use]
    pub fn scripted(statuses: Vec<SwarmStatus>) -> Self {
        Self {
            script: Mutex::new(statuses.into()),
            deliveries: Vec::new(),
            reject_add: None,
            added: Mutex::new(Vec::new()),
            abandoned: AtomicUsize::new(0),
        }
    }

    /// Engine whose `add` always fails with `message`.
    #[must_use]
    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_add: Some(message.to_string()),
            ..Self::scripted(Vec::new())
        }
    }

    /// Engine that writes `files` (relative to the destination) when a job is
    /// added and immediately reports `payload` as seeded.
    #[must_use]
    pub fn delivering(payload: impl Into<PathBuf>, files: Vec<(PathBuf, Vec<u8>)>) -> Self {
        let bytes: u64 = files.iter().map(|(_, data)| data.len() as u64).sum();
        let seeded = SwarmStatus {
            state: AcquisitionState::Complete,
            bytes_done: bytes,
            bytes_total: bytes,
            download_rate: 0.0,
            is_seed: true,
            payload: Some(payload.into()),
        };
        Self {
            deliveries: files,
            ..Self::scripted(vec![seeded])
        }
    }

    /// Manifests passed to `add`, in call order.
    #[must_use]
    pub fn added(&self) -> Vec<PathBuf> {
        lock(&self.added).clone()
    }

    /// Number of `abandon` calls observed.
    #[must_use]
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SwarmEngine for FakeSwarmEngine {
    async fn add(&self, manifest: &Path, destination: &Path) -> anyhow::Result<SwarmHandle> {
        if let Some(message) = &self.reject_add {
            return Err(anyhow!(message.clone()));
        }
        for (relative, data) in &self.deliveries {
            let path = destination.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        }
        lock(&self.added).push(manifest.to_path_buf());
        Ok(SwarmHandle {
            id: Uuid::new_v4(),
            manifest: manifest.to_path_buf(),
            destination: destination.to_path_buf(),
        })
    }

    async fn status(&self, _handle: &SwarmHandle) -> anyhow::Result<SwarmStatus> {
        let mut script = lock(&self.script);
        let status = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        status.ok_or_else(|| anyhow!("no scripted status"))
    }

    async fn abandon(&self, _handle: &SwarmHandle) -> anyhow::Result<()> {
        self.abandoned.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

enum TranscodeBehaviour {
    Succeed,
    Exit(i32),
    Error(String),
}

/// Transcoder with a fixed result that records every invocation.
///
/// On success the output file is written with the input's bytes prefixed by
/// a marker, so callers can tell the transcoded file apart.
pub struct ScriptedTranscoder {
    behaviour: TranscodeBehaviour,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl ScriptedTranscoder {
    /// Marker written at the start of every transcoded output.
    pub const MARKER: &'static [u8] = b"transcoded:";

    fn with(behaviour: TranscodeBehaviour) -> Self {
        Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Transcoder that exits zero and writes its output.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with(TranscodeBehaviour::Succeed)
    }

    /// Transcoder that exits with `code` and writes nothing.
    #[must_use]
    pub fn exiting(code: i32) -> Self {
        Self::with(TranscodeBehaviour::Exit(code))
    }

    /// Transcoder that cannot be started.
    #[must_use]
    pub fn unavailable(message: &str) -> Self {
        Self::with(TranscodeBehaviour::Error(message.to_string()))
    }

    /// `(input, output)` pairs seen so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl Transcoder for ScriptedTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> anyhow::Result<TranscodeExit> {
        lock(&self.calls).push((input.to_path_buf(), output.to_path_buf()));
        match &self.behaviour {
            TranscodeBehaviour::Succeed => {
                let mut data = Self::MARKER.to_vec();
                data.extend(fs::read(input).with_context(|| format!("failed to read {}", input.display()))?);
                fs::write(output, data)
                    .with_context(|| format!("failed to write {}", output.display()))?;
                Ok(TranscodeExit { code: Some(0) })
            }
            TranscodeBehaviour::Exit(code) => Ok(TranscodeExit { code: Some(*code) }),
            TranscodeBehaviour::Error(message) => Err(anyhow!(message.clone())),
        }
    }
}

/// One call observed by [`RecordingUploader`].
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// File handed to the uploader.
    pub file: ResolvedFile,
    /// Destination metadata handed to the uploader.
    pub target: UploadTarget,
    /// Whether the file existed on disk when the upload started.
    pub existed: bool,
}

/// Uploader that succeeds with `201` unless told otherwise, recording calls.
pub struct RecordingUploader {
    failing: BTreeSet<usize>,
    stalling: Option<usize>,
    calls: Mutex<Vec<RecordedUpload>>,
}

impl Default for RecordingUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingUploader {
    /// Uploader accepting every file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            failing: BTreeSet::new(),
            stalling: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Uploader answering `500` for the zero-based call indices given.
    #[must_use]
    pub fn failing_on(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing: indices.into_iter().collect(),
            ..Self::new()
        }
    }

    /// Uploader whose call at `index` never completes.
    #[must_use]
    pub fn stalling_on(index: usize) -> Self {
        Self {
            stalling: Some(index),
            ..Self::new()
        }
    }

    /// Calls observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedUpload> {
        lock(&self.calls).clone()
    }

    /// Upload names observed so far, in call order.
    #[must_use]
    pub fn uploaded_names(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .map(|call| call.file.upload_name.clone())
            .collect()
    }
}

#[async_trait]
impl Uploader for RecordingUploader {
    async fn upload(
        &self,
        file: &ResolvedFile,
        target: &UploadTarget,
        progress: ProgressSink,
    ) -> FileOutcome {
        let index = {
            let mut calls = lock(&self.calls);
            calls.push(RecordedUpload {
                file: file.clone(),
                target: target.clone(),
                existed: file.absolute_path.exists(),
            });
            calls.len() - 1
        };
        if self.stalling == Some(index) {
            std::future::pending::<()>().await;
        }

        let size = fs::metadata(&file.absolute_path).map_or(0, |metadata| metadata.len());
        progress(TransferProgress {
            bytes_transferred: size,
            total_bytes: size,
            rate_estimate: 0.0,
        });
        if self.failing.contains(&index) {
            FileOutcome::failed(file.clone(), Some(500), "internal server error")
        } else {
            FileOutcome::uploaded(file.clone(), 201)
        }
    }
}
