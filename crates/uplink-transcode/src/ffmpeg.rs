//! [`Transcoder`] backed by an `ffmpeg` process.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use uplink_core::{TranscodeExit, Transcoder};

/// Program used when no ffmpeg path is configured.
pub const DEFAULT_FFMPEG_PROGRAM: &str = "ffmpeg";

/// Re-encodes video to HEVC with the audio track dropped.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    /// Transcoder invoking `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program this transcoder runs.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn arguments(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-v", "quiet", "-stats", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.into());
        args.extend(
            [
                "-c:v",
                "libx265",
                "-preset",
                "medium",
                "-an",
                "-x265-params",
                "log-level=0",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(output.into());
        args
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_PROGRAM)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> anyhow::Result<TranscodeExit> {
        let args = Self::arguments(input, output);
        debug!(program = %self.program.display(), ?args, "running transcoder");
        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        Ok(TranscodeExit {
            code: status.code(),
        })
    }
}
