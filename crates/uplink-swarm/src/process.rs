//! Swarm engine driving an external client process, one per manifest.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uplink_core::{AcquisitionState, SwarmEngine, SwarmHandle, SwarmStatus};
use uuid::Uuid;
use walkdir::WalkDir;

/// Swarm client launched when none is configured.
pub const DEFAULT_SWARM_PROGRAM: &str = "aria2c";

/// Argument template for [`DEFAULT_SWARM_PROGRAM`]. `{manifest}` and
/// `{destination}` are substituted per job.
pub const DEFAULT_SWARM_ARGS: &[&str] = &["--seed-time=0", "--dir={destination}", "{manifest}"];

/// [`SwarmEngine`] that runs one external client process per manifest.
///
/// Every job downloads into its own directory beneath the destination, named
/// after the manifest and the job id, and `{destination}` expands to that
/// directory. The client is expected to exit with status zero once the
/// payload is on disk. A job directory holding a single entry reports that
/// entry as the payload; several entries report the job directory.
///
/// Jobs are forgotten once they reach a terminal state or are abandoned.
pub struct ProcessSwarmEngine {
    program: PathBuf,
    args: Vec<String>,
    jobs: Mutex<HashMap<Uuid, ProcessJob>>,
}

struct ProcessJob {
    child: Child,
    dir_name: OsString,
    started: Instant,
}

struct Scan {
    entries: Vec<OsString>,
    bytes: u64,
}

impl ProcessSwarmEngine {
    /// Engine running `program` with an argument template.
    #[must_use]
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Engine running `program` with [`DEFAULT_SWARM_ARGS`].
    #[must_use]
    pub fn with_default_args(program: impl Into<PathBuf>) -> Self {
        Self::new(program, DEFAULT_SWARM_ARGS.iter().copied())
    }

    fn render_args(&self, manifest: &Path, destination: &Path) -> Vec<String> {
        let manifest = manifest.to_string_lossy();
        let destination = destination.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{manifest}", &manifest)
                    .replace("{destination}", &destination)
            })
            .collect()
    }
}

impl Default for ProcessSwarmEngine {
    fn default() -> Self {
        Self::with_default_args(DEFAULT_SWARM_PROGRAM)
    }
}

#[async_trait]
impl SwarmEngine for ProcessSwarmEngine {
    async fn add(&self, manifest: &Path, destination: &Path) -> anyhow::Result<SwarmHandle> {
        let id = Uuid::new_v4();
        let dir_name = job_dir_name(manifest, id);
        let job_dir = destination.join(&dir_name);
        tokio::fs::create_dir_all(&job_dir)
            .await
            .with_context(|| format!("failed to create {}", job_dir.display()))?;

        let args = self.render_args(manifest, &job_dir);
        debug!(program = %self.program.display(), ?args, "launching swarm client");
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to launch swarm client {}", self.program.display()))?;

        self.jobs.lock().await.insert(
            id,
            ProcessJob {
                child,
                dir_name,
                started: Instant::now(),
            },
        );
        Ok(SwarmHandle {
            id,
            manifest: manifest.to_path_buf(),
            destination: destination.to_path_buf(),
        })
    }

    async fn status(&self, handle: &SwarmHandle) -> anyhow::Result<SwarmStatus> {
        let (exit, dir_name, started) = {
            let mut jobs = self.jobs.lock().await;
            let job = jobs
                .get_mut(&handle.id)
                .ok_or_else(|| anyhow!("unknown swarm job {}", handle.id))?;
            let exit = job
                .child
                .try_wait()
                .context("failed to poll swarm client")?;
            (exit, job.dir_name.clone(), job.started)
        };

        let job_dir = handle.destination.join(&dir_name);
        let scan = tokio::task::spawn_blocking(move || scan_job_dir(&job_dir))
            .await
            .context("job directory scan panicked")??;
        let download_rate = rate(scan.bytes, started.elapsed().as_secs_f64());

        let Some(exit) = exit else {
            return Ok(SwarmStatus {
                state: AcquisitionState::Downloading,
                bytes_done: scan.bytes,
                bytes_total: 0,
                download_rate,
                is_seed: false,
                payload: None,
            });
        };

        self.jobs.lock().await.remove(&handle.id);
        let status = finished_status(exit, &dir_name, scan);
        info!(job = %handle.id, state = status.state.as_str(), "swarm client exited");
        Ok(status)
    }

    async fn abandon(&self, handle: &SwarmHandle) -> anyhow::Result<()> {
        let job = self.jobs.lock().await.remove(&handle.id);
        if let Some(mut job) = job {
            job.child
                .kill()
                .await
                .context("failed to stop swarm client")?;
            info!(job = %handle.id, "swarm client stopped");
        }
        Ok(())
    }
}

fn job_dir_name(manifest: &Path, id: Uuid) -> OsString {
    let stem = manifest
        .file_stem()
        .map_or_else(|| "swarm".into(), |stem| stem.to_string_lossy());
    let id = id.simple().to_string();
    let short = id.get(..8).unwrap_or(&id);
    OsString::from(format!("{stem}-{short}"))
}

fn finished_status(exit: ExitStatus, dir_name: &OsStr, scan: Scan) -> SwarmStatus {
    if !exit.success() {
        return failed(format!("swarm client exited with {exit}"));
    }
    let job_dir = PathBuf::from(dir_name);
    match scan.entries.as_slice() {
        [] => failed("swarm client exited without producing a payload".to_string()),
        [single] => complete(scan.bytes, job_dir.join(single)),
        _ => complete(scan.bytes, job_dir),
    }
}

fn complete(bytes: u64, payload: PathBuf) -> SwarmStatus {
    SwarmStatus {
        state: AcquisitionState::Complete,
        bytes_done: bytes,
        bytes_total: bytes,
        download_rate: 0.0,
        is_seed: true,
        payload: Some(payload),
    }
}

fn failed(message: String) -> SwarmStatus {
    SwarmStatus {
        state: AcquisitionState::Failed { message },
        ..SwarmStatus::queued()
    }
}

fn scan_job_dir(dir: &Path) -> anyhow::Result<Scan> {
    let listing = fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    let mut entries = Vec::new();
    for entry in listing {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        entries.push(entry.file_name());
    }
    entries.sort();
    Ok(Scan {
        entries,
        bytes: tree_size(dir),
    })
}

fn tree_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

#[expect(clippy::cast_precision_loss, reason = "rates are estimates")]
fn rate(bytes: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        bytes as f64 / seconds
    } else {
        0.0
    }
}
