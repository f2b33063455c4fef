//! Output renderers and formatting helpers for CLI commands.

use std::io::{self, Write};

use anyhow::anyhow;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use uplink_core::{BatchResult, FileOutcome, TransferProgress};
use uplink_pipeline::PipelineEvent;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

#[derive(Serialize)]
struct BatchReport<'a> {
    uploaded: usize,
    failed: usize,
    outcomes: &'a [FileOutcome],
}

pub(crate) fn render_batch(batch: &BatchResult, format: OutputFormat) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_batch(&mut out, batch, format)
}

pub(crate) fn write_batch(
    out: &mut impl Write,
    batch: &BatchResult,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let report = BatchReport {
                uploaded: batch.uploaded_count(),
                failed: batch.failed_count(),
                outcomes: batch.outcomes(),
            };
            let text = serde_json::to_string_pretty(&report)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            writeln!(out, "{text}").map_err(write_failed)?;
        }
        OutputFormat::Table => {
            writeln!(out, "{:<8} {:>4} {:<24} NAME", "STATUS", "HTTP", "TYPE")
                .map_err(write_failed)?;
            for outcome in batch {
                let http = outcome
                    .http_status
                    .map_or_else(|| "-".to_string(), |status| status.to_string());
                writeln!(
                    out,
                    "{:<8} {:>4} {:<24} {}",
                    outcome.status.as_str(),
                    http,
                    outcome.file.mime_type,
                    outcome.file.upload_name
                )
                .map_err(write_failed)?;
                if let Some(detail) = &outcome.error_detail {
                    writeln!(out, "         reason: {detail}").map_err(write_failed)?;
                }
            }
            writeln!(
                out,
                "{} uploaded, {} failed",
                batch.uploaded_count(),
                batch.failed_count()
            )
            .map_err(write_failed)?;
        }
    }
    Ok(())
}

fn write_failed(err: io::Error) -> CliError {
    CliError::failure(anyhow!("failed to write output: {err}"))
}

const TRANSFER_TEMPLATE: &str =
    "{msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} {bytes_per_sec} eta {eta}";

/// Draw progress for pipeline events on stderr until the sender is dropped.
///
/// Bars are hidden when `enabled` is false; indicatif also hides them when
/// stderr is not a terminal.
pub(crate) async fn render_events(mut events: UnboundedReceiver<PipelineEvent>, enabled: bool) {
    let bar = transfer_bar(enabled);
    let mut current = None;
    while let Some(event) = events.recv().await {
        apply_event(&bar, &mut current, event);
    }
    bar.finish_and_clear();
}

fn transfer_bar(enabled: bool) -> ProgressBar {
    let bar = if enabled {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    let style = ProgressStyle::with_template(TRANSFER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}

fn apply_event(bar: &ProgressBar, current: &mut Option<usize>, event: PipelineEvent) {
    match event {
        PipelineEvent::AcquisitionProgress { progress } => {
            bar.set_message("acquiring");
            show(bar, &progress);
        }
        PipelineEvent::Resolved { total } => {
            bar.reset();
            bar.set_length(0);
            bar.println(format!("{total} file(s) to upload"));
        }
        PipelineEvent::FileStarted { index, total, file } => {
            *current = Some(index);
            bar.reset();
            bar.set_length(0);
            bar.set_message(format!("[{}/{total}] {}", index + 1, file.upload_name));
        }
        PipelineEvent::TransferProgress { index, progress } => {
            if *current == Some(index) {
                show(bar, &progress);
            }
        }
        PipelineEvent::FileFinished { outcome, .. } => {
            *current = None;
            if let Some(detail) = &outcome.error_detail {
                bar.println(format!("failed {}: {detail}", outcome.file.upload_name));
            }
        }
    }
}

fn show(bar: &ProgressBar, progress: &TransferProgress) {
    bar.set_length(progress.total_bytes);
    bar.set_position(progress.bytes_transferred);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use uplink_core::ResolvedFile;

    fn batch() -> BatchResult {
        let mut batch = BatchResult::default();
        batch.push(FileOutcome::uploaded(
            ResolvedFile::new("/data/a.pdf", "application/pdf", "docs/a.pdf"),
            201,
        ));
        batch.push(FileOutcome::failed(
            ResolvedFile::new("/data/b.mp4", "video/mp4", "docs/b.mp4"),
            Some(500),
            "server responded 500 Internal Server Error: boom",
        ));
        batch
    }

    fn render(format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let mut buffer = Vec::new();
        write_batch(&mut buffer, &batch(), format)?;
        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn table_lists_outcomes_and_summary() -> Result<(), Box<dyn Error>> {
        let text = render(OutputFormat::Table)?;
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("STATUS"));
        assert!(lines[1].starts_with("uploaded"));
        assert!(lines[1].ends_with("docs/a.pdf"));
        assert!(lines[2].starts_with("failed"));
        assert!(lines[3].contains("reason: server responded 500"));
        assert_eq!(lines.last().copied(), Some("1 uploaded, 1 failed"));
        Ok(())
    }

    #[test]
    fn json_report_carries_counts() -> Result<(), Box<dyn Error>> {
        let value: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)?)?;
        assert_eq!(value["uploaded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["outcomes"][0]["status"], "uploaded");
        assert_eq!(value["outcomes"][1]["http_status"], 500);
        assert_eq!(value["outcomes"][1]["file"]["upload_name"], "docs/b.mp4");
        Ok(())
    }

    fn sample(done: u64, total: u64) -> TransferProgress {
        TransferProgress {
            bytes_transferred: done,
            total_bytes: total,
            rate_estimate: 0.0,
        }
    }

    #[test]
    fn progress_bar_follows_the_current_file() {
        let bar = transfer_bar(false);
        let mut current = None;

        apply_event(
            &bar,
            &mut current,
            PipelineEvent::AcquisitionProgress {
                progress: sample(40, 100),
            },
        );
        assert_eq!(bar.message(), "acquiring");
        assert_eq!((bar.position(), bar.length()), (40, Some(100)));

        apply_event(
            &bar,
            &mut current,
            PipelineEvent::FileStarted {
                index: 1,
                total: 2,
                file: ResolvedFile::new("/data/a.pdf", "application/pdf", "docs/a.pdf"),
            },
        );
        assert_eq!(bar.message(), "[2/2] docs/a.pdf");
        assert_eq!(bar.position(), 0);

        apply_event(
            &bar,
            &mut current,
            PipelineEvent::TransferProgress {
                index: 1,
                progress: sample(512, 1024),
            },
        );
        assert_eq!((bar.position(), bar.length()), (512, Some(1024)));

        apply_event(
            &bar,
            &mut current,
            PipelineEvent::TransferProgress {
                index: 0,
                progress: sample(9, 10),
            },
        );
        assert_eq!(bar.position(), 512);
    }

    #[tokio::test]
    async fn render_events_drains_until_closed() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(PipelineEvent::Resolved { total: 1 }).ok();
        drop(tx);
        render_events(rx, false).await;
    }
}
