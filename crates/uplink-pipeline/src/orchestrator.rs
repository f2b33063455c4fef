//! Sequential upload worker.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uplink_core::{
    BatchResult, FileOutcome, ProgressSink, ResolvedFile, TransformCleanup, TransformHint,
    UploadRequest, UploadTarget, Uploader,
};
use uplink_fsops::{FALLBACK_MIME, resolve, sniff_mime, upload_name};
use uplink_swarm::AcquisitionAdapter;
use uplink_transcode::TransformAdapter;

use crate::error::{PipelineError, PipelineResult};
use crate::events::PipelineEvent;

/// Error detail recorded for a file interrupted by cancellation.
pub const CANCELLED_DETAIL: &str = "cancelled";

/// Processes one [`UploadRequest`] at a time, one file at a time.
///
/// A failure on one file is recorded in the batch and never stops the files
/// after it. Only cancellation ends a batch early.
pub struct UploadPipeline {
    uploader: Arc<dyn Uploader>,
    acquisition: Option<AcquisitionAdapter>,
    transform: Option<TransformAdapter>,
    cancel: CancellationToken,
    events: Option<UnboundedSender<PipelineEvent>>,
}

impl UploadPipeline {
    /// Pipeline uploading through `uploader`, without acquisition or transform support.
    #[must_use]
    pub fn new(uploader: Arc<dyn Uploader>) -> Self {
        Self {
            uploader,
            acquisition: None,
            transform: None,
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    /// Enable swarm manifests as upload sources.
    #[must_use]
    pub fn with_acquisition(mut self, adapter: AcquisitionAdapter) -> Self {
        self.acquisition = Some(adapter);
        self
    }

    /// Enable [`TransformHint::VideoCompress`].
    #[must_use]
    pub fn with_transform(mut self, adapter: TransformAdapter) -> Self {
        self.transform = Some(adapter);
        self
    }

    /// Use `token` to interrupt runs.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Forward [`PipelineEvent`]s to `sender`.
    #[must_use]
    pub fn with_events(mut self, sender: UnboundedSender<PipelineEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Token that interrupts this pipeline when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run `request` to completion.
    ///
    /// Every resolved file yields exactly one outcome, in resolution order,
    /// unless the run is cancelled: the interrupted file is then recorded with
    /// [`CANCELLED_DETAIL`] and the remaining files are not started.
    ///
    /// # Errors
    ///
    /// Fails without a batch when validation rejects the request, when
    /// acquisition fails, or when the source cannot be resolved.
    pub async fn run(&self, request: &UploadRequest) -> PipelineResult<BatchResult> {
        self.validate(request)?;

        let source = if request.is_manifest() {
            self.acquire(request).await?
        } else {
            request.source_path.clone()
        };
        let paths = resolve(&source).map_err(|err| PipelineError::resolve(&source, err))?;
        let total = paths.len();
        info!(source = %source.display(), files = total, "upload source resolved");
        self.emit(PipelineEvent::Resolved { total });

        let target = request.target();
        let mut batch = BatchResult::default();
        for (index, path) in paths.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(remaining = total - index, "run cancelled; skipping remaining files");
                break;
            }
            let outcome = self
                .process_file(index, total, &source, path, request, &target)
                .await;
            let interrupted = outcome.error_detail.as_deref() == Some(CANCELLED_DETAIL);
            self.emit(PipelineEvent::FileFinished {
                index,
                outcome: outcome.clone(),
            });
            batch.push(outcome);
            if interrupted {
                break;
            }
        }

        info!(
            uploaded = batch.uploaded_count(),
            failed = batch.failed_count(),
            "upload run finished"
        );
        Ok(batch)
    }

    fn validate(&self, request: &UploadRequest) -> PipelineResult<()> {
        if request.destination_folder.trim().is_empty() {
            return Err(PipelineError::configuration(
                "destination_folder",
                "must not be empty",
            ));
        }
        if request.is_manifest() {
            if request.acquisition_work_dir.is_none() {
                return Err(PipelineError::configuration(
                    "acquisition_work_dir",
                    "required when the source is a swarm manifest",
                ));
            }
            if self.acquisition.is_none() {
                return Err(PipelineError::configuration(
                    "acquisition",
                    "no swarm engine configured",
                ));
            }
        }
        if request.transform_hint == TransformHint::VideoCompress && self.transform.is_none() {
            return Err(PipelineError::configuration(
                "transform_hint",
                "no transcoder configured",
            ));
        }
        Ok(())
    }

    async fn acquire(&self, request: &UploadRequest) -> PipelineResult<PathBuf> {
        let (Some(adapter), Some(work_dir)) = (&self.acquisition, &request.acquisition_work_dir)
        else {
            return Err(PipelineError::configuration(
                "acquisition",
                "no swarm engine configured",
            ));
        };
        if !request.source_path.is_file() {
            return Err(PipelineError::PathNotFound {
                path: request.source_path.clone(),
            });
        }

        let events = self.events.clone();
        let sink: ProgressSink = Arc::new(move |progress| {
            if let Some(events) = &events {
                let _ = events.send(PipelineEvent::AcquisitionProgress { progress });
            }
        });
        adapter
            .acquire(&request.source_path, work_dir, &self.cancel, sink)
            .await
            .map_err(|source| PipelineError::Acquisition { source })
    }

    async fn process_file(
        &self,
        index: usize,
        total: usize,
        root: &Path,
        path: &Path,
        request: &UploadRequest,
        target: &UploadTarget,
    ) -> FileOutcome {
        let name = upload_name(root, path);
        let original = match sniff_mime(path) {
            Ok(mime) => ResolvedFile::new(path, mime, name),
            Err(err) => {
                warn!(path = %path.display(), error = %error_chain(&err), "file unreadable");
                return FileOutcome::failed(
                    ResolvedFile::new(path, FALLBACK_MIME, name),
                    None,
                    format!("unreadable file: {}", error_chain(&err)),
                );
            }
        };
        info!(
            index = index + 1,
            total,
            path = %path.display(),
            mime = %original.mime_type,
            "processing file"
        );
        self.emit(PipelineEvent::FileStarted {
            index,
            total,
            file: original.clone(),
        });

        let wants_transform =
            request.transform_hint == TransformHint::VideoCompress && original.is_video();
        let file = match (&self.transform, wants_transform) {
            (Some(adapter), true) => {
                let transformed = tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => {
                        return FileOutcome::failed(original.clone(), None, CANCELLED_DETAIL);
                    }
                    result = adapter.transform(&original, request.transform_hint) => result,
                };
                match transformed {
                    Ok(file) => file,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err.detail(), "transform failed");
                        return FileOutcome::failed(original, None, err.detail());
                    }
                }
            }
            _ => {
                if request.transform_hint == TransformHint::VideoCompress {
                    debug!(path = %path.display(), mime = %original.mime_type, "not a video; sending as is");
                }
                original.clone()
            }
        };

        let events = self.events.clone();
        let sink: ProgressSink = Arc::new(move |progress| {
            if let Some(events) = &events {
                let _ = events.send(PipelineEvent::TransferProgress { index, progress });
            }
        });
        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                warn!(path = %file.absolute_path.display(), "upload interrupted");
                FileOutcome::failed(file.clone(), None, CANCELLED_DETAIL)
            }
            outcome = self.uploader.upload(&file, target, sink) => outcome,
        };

        if outcome.is_uploaded() && file.absolute_path != original.absolute_path {
            apply_cleanup(request.cleanup, &original, &file).await;
        }
        outcome
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

async fn apply_cleanup(policy: TransformCleanup, original: &ResolvedFile, transformed: &ResolvedFile) {
    let doomed = match policy {
        TransformCleanup::Keep => return,
        TransformCleanup::RemoveOriginal => &original.absolute_path,
        TransformCleanup::RemoveTranscoded => &transformed.absolute_path,
    };
    match tokio::fs::remove_file(doomed).await {
        Ok(()) => debug!(path = %doomed.display(), "removed after upload"),
        Err(err) => warn!(path = %doomed.display(), error = %err, "cleanup failed"),
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::time::Duration;

    use tokio::sync::mpsc;
    use uplink_core::OutcomeStatus;
    use uplink_swarm::{AcquisitionAdapter, AcquisitionError};
    use uplink_test_support::{
        FakeSwarmEngine, RecordingUploader, ScriptedTranscoder, mp4_bytes, pdf_bytes, write_file,
        write_tree,
    };

    type TestResult = Result<(), Box<dyn Error>>;

    fn pipeline(uploader: &Arc<RecordingUploader>) -> UploadPipeline {
        UploadPipeline::new(uploader.clone())
    }

    fn with_transcoder(
        uploader: &Arc<RecordingUploader>,
        transcoder: &Arc<ScriptedTranscoder>,
    ) -> UploadPipeline {
        pipeline(uploader).with_transform(TransformAdapter::new(transcoder.clone()))
    }

    #[tokio::test]
    async fn pdf_with_video_hint_is_uploaded_as_is() -> TestResult {
        let temp = tempfile::tempdir()?;
        let report = write_file(temp.path(), "report.pdf", &pdf_bytes())?;
        let uploader = Arc::new(RecordingUploader::new());
        let transcoder = Arc::new(ScriptedTranscoder::succeeding());

        let request = UploadRequest::new(&report, "docs")
            .with_tags(["q1"])
            .with_transform(TransformHint::VideoCompress);
        let batch = with_transcoder(&uploader, &transcoder).run(&request).await?;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.uploaded_count(), 1);
        assert!(transcoder.calls().is_empty());
        let calls = uploader.calls();
        assert_eq!(calls[0].file.absolute_path, report);
        assert_eq!(calls[0].file.mime_type, "application/pdf");
        assert_eq!(calls[0].file.upload_name, "report.pdf");
        assert_eq!(calls[0].target.destination_folder, "docs");
        assert_eq!(calls[0].target.tags, ["q1"]);
        Ok(())
    }

    #[tokio::test]
    async fn video_with_hint_uploads_transcoded_output() -> TestResult {
        let temp = tempfile::tempdir()?;
        let movie = write_file(temp.path(), "movie.mp4", &mp4_bytes())?;
        let uploader = Arc::new(RecordingUploader::new());
        let transcoder = Arc::new(ScriptedTranscoder::succeeding());

        let request =
            UploadRequest::new(&movie, "videos").with_transform(TransformHint::VideoCompress);
        let batch = with_transcoder(&uploader, &transcoder).run(&request).await?;

        assert_eq!(batch.uploaded_count(), 1);
        assert_eq!(transcoder.calls().len(), 1);
        let uploaded = &uploader.calls()[0].file;
        assert_eq!(uploaded.absolute_path, temp.path().join("movie.hevc.mp4"));
        assert_eq!(uploaded.mime_type, "video/mp4");
        assert_eq!(uploaded.upload_name, "movie.hevc.mp4");
        assert!(movie.exists());
        assert!(uploaded.absolute_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn video_without_hint_is_not_transcoded() -> TestResult {
        let temp = tempfile::tempdir()?;
        let movie = write_file(temp.path(), "movie.mp4", &mp4_bytes())?;
        let uploader = Arc::new(RecordingUploader::new());
        let transcoder = Arc::new(ScriptedTranscoder::succeeding());

        let batch = with_transcoder(&uploader, &transcoder)
            .run(&UploadRequest::new(&movie, "videos"))
            .await?;
        assert_eq!(batch.uploaded_count(), 1);
        assert!(transcoder.calls().is_empty());
        assert_eq!(uploader.calls()[0].file.absolute_path, movie);
        Ok(())
    }

    #[tokio::test]
    async fn manifest_source_is_acquired_then_uploaded() -> TestResult {
        let temp = tempfile::tempdir()?;
        let manifest = write_file(temp.path(), "pack.torrent", b"d8:announce0:e")?;
        let downloads = temp.path().join("downloads");
        let engine = Arc::new(FakeSwarmEngine::delivering(
            "pack",
            vec![
                (PathBuf::from("pack/a.mp4"), mp4_bytes()),
                (PathBuf::from("pack/b.txt"), b"notes".to_vec()),
            ],
        ));
        let uploader = Arc::new(RecordingUploader::new());
        let adapter = AcquisitionAdapter::new(engine.clone()).with_poll_interval(Duration::from_millis(5));

        let request = UploadRequest::new(&manifest, "media").with_acquisition_work_dir(&downloads);
        let batch = pipeline(&uploader).with_acquisition(adapter).run(&request).await?;

        assert_eq!(engine.added(), vec![manifest]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.uploaded_count(), 2);
        assert_eq!(uploader.uploaded_names(), ["pack/a.mp4", "pack/b.txt"]);
        let mimes: Vec<String> = uploader
            .calls()
            .iter()
            .map(|call| call.file.mime_type.clone())
            .collect();
        assert_eq!(mimes, ["video/mp4", "text/plain"]);
        Ok(())
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() -> TestResult {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("photos");
        write_tree(
            &root,
            &[("a.txt", b"a"), ("b.txt", b"b"), ("c.txt", b"c"), ("d.txt", b"d")],
        )?;
        let uploader = Arc::new(RecordingUploader::failing_on([2]));

        let batch = pipeline(&uploader)
            .run(&UploadRequest::new(&root, "photos"))
            .await?;

        assert_eq!(batch.len(), 4);
        assert_eq!(batch.failed_count(), 1);
        let statuses: Vec<OutcomeStatus> = batch.outcomes().iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            [
                OutcomeStatus::Uploaded,
                OutcomeStatus::Uploaded,
                OutcomeStatus::Failed,
                OutcomeStatus::Uploaded
            ]
        );
        assert_eq!(batch.outcomes()[2].file.upload_name, "photos/c.txt");
        assert_eq!(batch.outcomes()[2].http_status, Some(500));
        Ok(())
    }

    #[tokio::test]
    async fn directory_uploads_each_file_once() -> TestResult {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("tree");
        let files = write_tree(
            &root,
            &[("x/1.txt", b"1"), ("x/y/2.txt", b"2"), ("3.txt", b"3")],
        )?;
        let uploader = Arc::new(RecordingUploader::new());

        let batch = pipeline(&uploader)
            .run(&UploadRequest::new(&root, "dump"))
            .await?;
        assert_eq!(batch.len(), files.len());
        let seen: BTreeSet<PathBuf> = uploader
            .calls()
            .into_iter()
            .map(|call| call.file.absolute_path)
            .collect();
        let expected: BTreeSet<PathBuf> = files.into_iter().collect();
        assert_eq!(seen, expected);
        Ok(())
    }

    #[tokio::test]
    async fn repeated_runs_upload_again() -> TestResult {
        let temp = tempfile::tempdir()?;
        let report = write_file(temp.path(), "report.pdf", &pdf_bytes())?;
        let uploader = Arc::new(RecordingUploader::new());
        let pipeline = pipeline(&uploader);
        let request = UploadRequest::new(&report, "docs");

        pipeline.run(&request).await?;
        pipeline.run(&request).await?;
        assert_eq!(uploader.calls().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_before_any_upload() -> TestResult {
        let temp = tempfile::tempdir()?;
        let report = write_file(temp.path(), "report.pdf", &pdf_bytes())?;
        let manifest = write_file(temp.path(), "pack.TORRENT", b"d8:announce0:e")?;
        let uploader = Arc::new(RecordingUploader::new());
        let engine = Arc::new(FakeSwarmEngine::scripted(Vec::new()));

        let empty_folder = pipeline(&uploader).run(&UploadRequest::new(&report, "  ")).await;
        assert!(matches!(
            empty_folder,
            Err(PipelineError::Configuration {
                field: "destination_folder",
                ..
            })
        ));

        let no_work_dir = pipeline(&uploader)
            .with_acquisition(AcquisitionAdapter::new(engine.clone()))
            .run(&UploadRequest::new(&manifest, "media"))
            .await;
        assert!(matches!(
            no_work_dir,
            Err(PipelineError::Configuration {
                field: "acquisition_work_dir",
                ..
            })
        ));

        let no_engine = pipeline(&uploader)
            .run(&UploadRequest::new(&manifest, "media").with_acquisition_work_dir(temp.path()))
            .await;
        assert!(matches!(
            no_engine,
            Err(PipelineError::Configuration {
                field: "acquisition",
                ..
            })
        ));

        let no_transcoder = pipeline(&uploader)
            .run(&UploadRequest::new(&report, "docs").with_transform(TransformHint::VideoCompress))
            .await;
        assert!(matches!(
            no_transcoder,
            Err(PipelineError::Configuration {
                field: "transform_hint",
                ..
            })
        ));

        assert!(uploader.calls().is_empty());
        assert!(engine.added().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_source_is_fatal() -> TestResult {
        let temp = tempfile::tempdir()?;
        let uploader = Arc::new(RecordingUploader::new());
        let result = pipeline(&uploader)
            .run(&UploadRequest::new(temp.path().join("gone"), "docs"))
            .await;
        assert!(matches!(result, Err(PipelineError::PathNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn acquisition_failure_is_fatal() -> TestResult {
        let temp = tempfile::tempdir()?;
        let manifest = write_file(temp.path(), "pack.torrent", b"d8:announce0:e")?;
        let engine = Arc::new(FakeSwarmEngine::rejecting("bad manifest"));
        let uploader = Arc::new(RecordingUploader::new());

        let result = pipeline(&uploader)
            .with_acquisition(AcquisitionAdapter::new(engine))
            .run(&UploadRequest::new(&manifest, "media").with_acquisition_work_dir(temp.path()))
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::Acquisition {
                source: AcquisitionError::Engine { .. }
            })
        ));
        assert!(uploader.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn transform_failure_is_recorded_and_batch_continues() -> TestResult {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("clips");
        write_file(&root, "a.mp4", &mp4_bytes())?;
        write_file(&root, "b.pdf", &pdf_bytes())?;
        let uploader = Arc::new(RecordingUploader::new());
        let transcoder = Arc::new(ScriptedTranscoder::exiting(1));

        let request = UploadRequest::new(&root, "clips").with_transform(TransformHint::VideoCompress);
        let batch = with_transcoder(&uploader, &transcoder).run(&request).await?;

        assert_eq!(batch.len(), 2);
        let failed = &batch.outcomes()[0];
        assert_eq!(failed.status, OutcomeStatus::Failed);
        assert_eq!(failed.file.absolute_path, root.join("a.mp4"));
        assert!(failed.error_detail.as_deref().is_some_and(|d| d.contains("transform failed")));
        assert!(root.join("a.mp4").exists());
        assert_eq!(batch.outcomes()[1].status, OutcomeStatus::Uploaded);
        assert_eq!(uploader.uploaded_names(), ["clips/b.pdf"]);
        Ok(())
    }

    #[tokio::test]
    async fn cleanup_policy_removes_the_chosen_file() -> TestResult {
        let temp = tempfile::tempdir()?;
        let uploader = Arc::new(RecordingUploader::new());
        let transcoder = Arc::new(ScriptedTranscoder::succeeding());

        let movie = write_file(temp.path(), "one.mp4", &mp4_bytes())?;
        let request = UploadRequest::new(&movie, "v")
            .with_transform(TransformHint::VideoCompress)
            .with_cleanup(TransformCleanup::RemoveTranscoded);
        with_transcoder(&uploader, &transcoder).run(&request).await?;
        assert!(movie.exists());
        assert!(!temp.path().join("one.hevc.mp4").exists());

        let movie = write_file(temp.path(), "two.mp4", &mp4_bytes())?;
        let request = UploadRequest::new(&movie, "v")
            .with_transform(TransformHint::VideoCompress)
            .with_cleanup(TransformCleanup::RemoveOriginal);
        with_transcoder(&uploader, &transcoder).run(&request).await?;
        assert!(!movie.exists());
        assert!(temp.path().join("two.hevc.mp4").exists());
        Ok(())
    }

    #[tokio::test]
    async fn cleanup_is_skipped_when_upload_fails() -> TestResult {
        let temp = tempfile::tempdir()?;
        let movie = write_file(temp.path(), "movie.mp4", &mp4_bytes())?;
        let uploader = Arc::new(RecordingUploader::failing_on([0]));
        let transcoder = Arc::new(ScriptedTranscoder::succeeding());

        let request = UploadRequest::new(&movie, "v")
            .with_transform(TransformHint::VideoCompress)
            .with_cleanup(TransformCleanup::RemoveOriginal);
        let batch = with_transcoder(&uploader, &transcoder).run(&request).await?;
        assert!(batch.has_failures());
        assert!(movie.exists());
        Ok(())
    }

    #[tokio::test]
    async fn cancellation_records_interrupted_file_and_stops() -> TestResult {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("batch");
        write_tree(&root, &[("1.txt", b"1"), ("2.txt", b"2"), ("3.txt", b"3")])?;
        let uploader = Arc::new(RecordingUploader::stalling_on(1));
        let pipeline = pipeline(&uploader);
        let cancel = pipeline.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });
        let batch = pipeline.run(&UploadRequest::new(&root, "b")).await?;

        assert_eq!(batch.len(), 2);
        assert!(batch.outcomes()[0].is_uploaded());
        assert_eq!(batch.outcomes()[1].error_detail.as_deref(), Some(CANCELLED_DETAIL));
        assert_eq!(uploader.calls().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn events_describe_the_run() -> TestResult {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("docs");
        write_tree(&root, &[("a.txt", b"alpha"), ("b.txt", b"beta")])?;
        let uploader = Arc::new(RecordingUploader::new());
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let pipeline = pipeline(&uploader).with_events(sender);
        pipeline.run(&UploadRequest::new(&root, "docs")).await?;
        drop(pipeline);

        let mut started = 0;
        let mut finished = 0;
        let mut progress = 0;
        let mut resolved = None;
        while let Some(event) = receiver.recv().await {
            match event {
                PipelineEvent::Resolved { total } => resolved = Some(total),
                PipelineEvent::FileStarted { total, .. } => {
                    assert_eq!(total, 2);
                    started += 1;
                }
                PipelineEvent::TransferProgress { .. } => progress += 1,
                PipelineEvent::FileFinished { outcome, .. } => {
                    assert!(outcome.is_uploaded());
                    finished += 1;
                }
                PipelineEvent::AcquisitionProgress { .. } => {}
            }
        }
        assert_eq!(resolved, Some(2));
        assert_eq!((started, finished), (2, 2));
        assert!(progress >= 2);
        Ok(())
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = uplink_fsops::FsOpsError::Io {
            operation: "sniff.open",
            path: PathBuf::from("x"),
            source: std::io::Error::other("denied"),
        };
        assert_eq!(error_chain(&err), "fsops io failure: denied");
    }
}
