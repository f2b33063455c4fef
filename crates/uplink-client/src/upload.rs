//! Streamed multipart uploads.

use std::time::Instant;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uplink_core::{FileOutcome, ProgressSink, ResolvedFile, TransferProgress, UploadTarget, Uploader};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Upload endpoint, relative to the API base URL.
pub const UPLOAD_PATH: &str = "auth/file/";

const CHUNK_SIZE: usize = 64 * 1024;
const MAX_DETAIL_BODY: usize = 512;

/// [`Uploader`] posting files to the backend as `multipart/form-data`.
///
/// File content is read in fixed-size chunks while the request body is being
/// sent, so memory use does not grow with file size.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    session: Session,
    endpoint: Url,
}

impl HttpUploader {
    /// Uploader sending to `session`'s backend with `client`.
    ///
    /// # Errors
    ///
    /// Fails when the upload URL cannot be derived from the session.
    pub fn new(client: Client, session: Session) -> ClientResult<Self> {
        let endpoint = session.endpoint(UPLOAD_PATH)?;
        Ok(Self {
            client,
            session,
            endpoint,
        })
    }

    /// URL uploads are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(
        &self,
        file: &ResolvedFile,
        target: &UploadTarget,
        progress: ProgressSink,
    ) -> ClientResult<(StatusCode, String)> {
        let path = &file.absolute_path;
        let handle = tokio::fs::File::open(path)
            .await
            .map_err(|source| ClientError::io("upload.open", path, source))?;
        let total = handle
            .metadata()
            .await
            .map_err(|source| ClientError::io("upload.metadata", path, source))?
            .len();

        let started = Instant::now();
        progress(TransferProgress::observe(0, total, started.elapsed()));
        let mut sent = 0_u64;
        let chunks = ReaderStream::with_capacity(handle, CHUNK_SIZE).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                progress(TransferProgress::observe(sent, total, started.elapsed()));
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(chunks), total)
            .file_name(file.upload_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|source| ClientError::http("upload.mime", &self.endpoint, source))?;
        // Upload names carry `/` separators that must reach the backend verbatim.
        let mut form = Form::new()
            .percent_encode_noop()
            .text("virtfolder", target.destination_folder.clone())
            .text("tags", target.joined_tags());
        if let Some(description) = &target.description {
            form = form.text("description", description.clone());
        }
        let form = form.part("file", part);

        debug!(
            url = %self.endpoint,
            path = %path.display(),
            bytes = total,
            mime = %file.mime_type,
            "sending upload"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(COOKIE, self.session.cookie_header()?)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ClientError::http("upload.send", &self.endpoint, source))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok((status, body))
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        file: &ResolvedFile,
        target: &UploadTarget,
        progress: ProgressSink,
    ) -> FileOutcome {
        match self.send(file, target, progress).await {
            Ok((StatusCode::CREATED, _)) => {
                info!(
                    file = %file.upload_name,
                    folder = %target.destination_folder,
                    "upload accepted"
                );
                FileOutcome::uploaded(file.clone(), StatusCode::CREATED.as_u16())
            }
            Ok((status, body)) => {
                warn!(file = %file.upload_name, status = status.as_u16(), "upload rejected");
                FileOutcome::failed(
                    file.clone(),
                    Some(status.as_u16()),
                    rejection_detail(status, &body),
                )
            }
            Err(err) => {
                let detail = describe(&err);
                warn!(file = %file.upload_name, error = %detail, "upload failed");
                FileOutcome::failed(file.clone(), None, detail)
            }
        }
    }
}

fn rejection_detail(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("server responded {status}");
    }
    let mut excerpt: String = body.chars().take(MAX_DETAIL_BODY).collect();
    if excerpt.len() < body.len() {
        excerpt.push('…');
    }
    format!("server responded {status}: {excerpt}")
}

fn describe(err: &ClientError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
