use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;
use uplink_client::HttpUploader;
use uplink_core::{BatchResult, TransformHint, UploadRequest, parse_tags};
use uplink_pipeline::UploadPipeline;
use uplink_swarm::{AcquisitionAdapter, ProcessSwarmEngine};
use uplink_transcode::{FfmpegTranscoder, TransformAdapter};

use crate::cli::{OutputFormat, UploadArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_batch, render_events};

pub(crate) async fn handle_upload(ctx: &AppContext, args: UploadArgs) -> CliResult<()> {
    let batch = run_upload(ctx, &args).await?;
    render_batch(&batch, ctx.output)?;
    ensure_all_uploaded(&batch)
}

pub(crate) async fn run_upload(ctx: &AppContext, args: &UploadArgs) -> CliResult<BatchResult> {
    let session = ctx.session()?;
    let uploader = HttpUploader::new(ctx.client.clone(), session)?;
    let request = build_request(args);

    let transcoder = FfmpegTranscoder::new(ctx.ffmpeg.clone());
    let engine = ProcessSwarmEngine::with_default_args(ctx.swarm_client.clone());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let pipeline = UploadPipeline::new(Arc::new(uploader))
        .with_transform(TransformAdapter::new(Arc::new(transcoder)))
        .with_acquisition(
            AcquisitionAdapter::new(Arc::new(engine))
                .with_timeout(args.acquire_timeout.map(Duration::from_secs)),
        )
        .with_cancellation(ctx.cancel.clone())
        .with_events(events_tx);

    let renderer = tokio::spawn(render_events(events_rx, ctx.output == OutputFormat::Table));
    let result = pipeline.run(&request).await;
    drop(pipeline);
    let _ = renderer.await;

    let batch = result?;
    info!(
        uploaded = batch.uploaded_count(),
        failed = batch.failed_count(),
        "upload command finished"
    );
    Ok(batch)
}

pub(crate) fn build_request(args: &UploadArgs) -> UploadRequest {
    let mut request = UploadRequest::new(&args.source, args.folder.clone())
        .with_cleanup(args.cleanup.into());
    if let Some(raw) = args.tags.as_deref() {
        request = request.with_tags(parse_tags(raw));
    }
    if let Some(description) = &args.description {
        request = request.with_description(description.clone());
    }
    if args.hevc {
        request = request.with_transform(TransformHint::VideoCompress);
    }
    if let Some(dir) = &args.torrent_dir {
        request = request.with_acquisition_work_dir(dir);
    }
    request
}

pub(crate) fn ensure_all_uploaded(batch: &BatchResult) -> CliResult<()> {
    if batch.has_failures() {
        return Err(CliError::PartialFailure {
            failed: batch.failed_count(),
            total: batch.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CleanupArg;
    use crate::client::tests::context;
    use httpmock::prelude::*;
    use std::error::Error;
    use std::path::{Path, PathBuf};
    use uplink_core::TransformCleanup;
    use uplink_test_support::fixtures::{pdf_bytes, write_file, write_tree};

    fn args(source: &Path, folder: &str) -> UploadArgs {
        UploadArgs {
            source: source.to_path_buf(),
            folder: folder.to_string(),
            tags: None,
            description: None,
            hevc: false,
            torrent_dir: None,
            cleanup: CleanupArg::Keep,
            acquire_timeout: None,
        }
    }

    #[test]
    fn request_reflects_flags() {
        let mut upload = args(Path::new("clips"), "videos");
        upload.tags = Some("a, b,,c".to_string());
        upload.description = Some("holiday".to_string());
        upload.hevc = true;
        upload.torrent_dir = Some(PathBuf::from("/tmp/swarm"));
        upload.cleanup = CleanupArg::RemoveTranscoded;

        let request = build_request(&upload);
        assert_eq!(request.source_path, PathBuf::from("clips"));
        assert_eq!(request.destination_folder, "videos");
        assert_eq!(request.tags(), parse_tags("a, b,,c").as_slice());
        assert_eq!(request.description.as_deref(), Some("holiday"));
        assert_eq!(request.transform_hint, TransformHint::VideoCompress);
        assert_eq!(request.cleanup, TransformCleanup::RemoveTranscoded);
        assert_eq!(
            request.acquisition_work_dir.as_deref(),
            Some(Path::new("/tmp/swarm"))
        );
    }

    #[tokio::test]
    async fn uploads_single_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "report.pdf", &pdf_bytes())?;
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/file/")
                .header("cookie", "jwt=tok");
            then.status(201);
        });

        let ctx = context(server.base_url().parse()?, Some("tok"));
        let batch = run_upload(&ctx, &args(&path, "docs")).await?;
        mock.assert();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.uploaded_count(), 1);
        assert_eq!(batch.outcomes()[0].file.upload_name, "report.pdf");
        assert!(ensure_all_uploaded(&batch).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_files_exit_with_partial_failure() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = pdf_bytes();
        write_tree(
            dir.path(),
            &[("pack/a.pdf", pdf.as_slice()), ("pack/b.pdf", pdf.as_slice())],
        )?;
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/auth/file/");
            then.status(500).body("disk full");
        });

        let ctx = context(server.base_url().parse()?, Some("tok"));
        let Err(err) = handle_upload(&ctx, args(&dir.path().join("pack"), "docs")).await else {
            return Err("expected partial failure".into());
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.display_message(), "2 of 2 files failed to upload");
        Ok(())
    }

    #[tokio::test]
    async fn missing_token_is_a_validation_error() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "report.pdf", &pdf_bytes())?;
        let ctx = context("http://127.0.0.1:9".parse()?, None);
        let Err(err) = run_upload(&ctx, &args(&path, "docs")).await else {
            return Err("expected validation error".into());
        };
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn manifest_without_work_dir_is_rejected() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let manifest = write_file(dir.path(), "pack.torrent", b"d4:infoe")?;
        let ctx = context("http://127.0.0.1:9".parse()?, Some("tok"));
        let Err(err) = run_upload(&ctx, &args(&manifest, "docs")).await else {
            return Err("expected validation error".into());
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("acquisition_work_dir"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_source_is_a_validation_error() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let ctx = context("http://127.0.0.1:9".parse()?, Some("tok"));
        let Err(err) = run_upload(&ctx, &args(&dir.path().join("absent.pdf"), "docs")).await
        else {
            return Err("expected validation error".into());
        };
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }
}
