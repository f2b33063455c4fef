//! Applies a [`TransformHint`] to a resolved file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use uplink_core::{ResolvedFile, TransformHint, Transcoder};

use crate::error::{TransformError, TransformResult};

/// Extension given to transcoded outputs, replacing the input's extension.
pub const TRANSCODED_EXTENSION: &str = "hevc.mp4";

/// MIME type of transcoded outputs.
pub const TRANSCODED_MIME: &str = "video/mp4";

/// Runs a [`Transcoder`] for files that ask for it.
///
/// Outputs are written next to their input. Nothing is ever deleted here.
#[derive(Clone)]
pub struct TransformAdapter {
    transcoder: Arc<dyn Transcoder>,
}

impl TransformAdapter {
    /// Adapter delegating to `transcoder`.
    #[must_use]
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self { transcoder }
    }

    /// Transform `input` according to `hint`.
    ///
    /// `TransformHint::None` returns the input unchanged. `VideoCompress` runs
    /// the transcoder to completion and returns the derived file.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the transcoder cannot start, exits
    /// non-zero, or leaves no output.
    pub async fn transform(
        &self,
        input: &ResolvedFile,
        hint: TransformHint,
    ) -> TransformResult<ResolvedFile> {
        if hint == TransformHint::None {
            return Ok(input.clone());
        }

        let output = transcoded_path(&input.absolute_path);
        info!(
            input = %input.absolute_path.display(),
            output = %output.display(),
            "transcoding"
        );
        let exit = self
            .transcoder
            .transcode(&input.absolute_path, &output)
            .await
            .map_err(|err| TransformError::spawn(&input.absolute_path, err))?;
        if !exit.success() {
            return Err(TransformError::Failed {
                input: input.absolute_path.clone(),
                code: exit.code,
            });
        }
        if !output.is_file() {
            return Err(TransformError::MissingOutput {
                input: input.absolute_path.clone(),
                output,
            });
        }

        Ok(ResolvedFile::new(
            output,
            TRANSCODED_MIME,
            transcoded_name(&input.upload_name),
        ))
    }
}

/// Output location for a transcode of `input`: same directory and stem.
#[must_use]
pub fn transcoded_path(input: &Path) -> PathBuf {
    input.with_extension(TRANSCODED_EXTENSION)
}

/// Upload name for the transcoded form of a file uploaded as `name`.
#[must_use]
pub fn transcoded_name(name: &str) -> String {
    let (dir, file) = name.rsplit_once('/').map_or(("", name), |(dir, file)| (dir, file));
    let stem = match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    };
    if dir.is_empty() {
        format!("{stem}.{TRANSCODED_EXTENSION}")
    } else {
        format!("{dir}/{stem}.{TRANSCODED_EXTENSION}")
    }
}
