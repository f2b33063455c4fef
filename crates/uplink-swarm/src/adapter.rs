//! Polls a swarm engine until a manifest's payload is on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uplink_core::{AcquisitionState, ProgressSink, SwarmEngine, SwarmHandle};

use crate::error::{AcquisitionError, AcquisitionResult};

/// Interval between status polls when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Waits for a [`SwarmEngine`] to finish a manifest and reports where the
/// payload landed.
#[derive(Clone)]
pub struct AcquisitionAdapter {
    engine: Arc<dyn SwarmEngine>,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl AcquisitionAdapter {
    /// Adapter polling `engine` every [`DEFAULT_POLL_INTERVAL`] with no upper bound.
    #[must_use]
    pub fn new(engine: Arc<dyn SwarmEngine>) -> Self {
        Self {
            engine,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }

    /// Override the status poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound the total wait; `None` waits until completion or cancellation.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Acquire the content described by `manifest` into `destination`.
    ///
    /// Blocks until the engine reports the payload complete, then returns its
    /// location, relative to the working directory when it lies beneath it.
    /// Every poll forwards a progress sample to `progress`.
    ///
    /// # Errors
    ///
    /// Fails when the engine errors or reports failure, when the wait bound
    /// elapses, or when `cancel` fires. Abandoned jobs are handed back to the
    /// engine via [`SwarmEngine::abandon`].
    pub async fn acquire(
        &self,
        manifest: &Path,
        destination: &Path,
        cancel: &CancellationToken,
        progress: ProgressSink,
    ) -> AcquisitionResult<PathBuf> {
        let handle = self
            .engine
            .add(manifest, destination)
            .await
            .map_err(|err| AcquisitionError::engine("swarm.add", manifest, err))?;
        info!(
            job = %handle.id,
            manifest = %manifest.display(),
            destination = %destination.display(),
            "acquisition started"
        );

        let started = Instant::now();
        let deadline = self.timeout.map(|timeout| started + timeout);
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_state: Option<AcquisitionState> = None;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    self.abandon(&handle).await;
                    return Err(AcquisitionError::Cancelled {
                        manifest: manifest.to_path_buf(),
                    });
                }
                () = sleep_until(deadline) => {
                    self.abandon(&handle).await;
                    return Err(AcquisitionError::Timeout {
                        manifest: manifest.to_path_buf(),
                        waited: started.elapsed(),
                    });
                }
                _ = ticker.tick() => {}
            }

            let status = self
                .engine
                .status(&handle)
                .await
                .map_err(|err| AcquisitionError::engine("swarm.status", manifest, err))?;
            if last_state.as_ref() != Some(&status.state) {
                info!(job = %handle.id, state = status.state.as_str(), "acquisition state changed");
                last_state = Some(status.state.clone());
            }
            debug!(
                job = %handle.id,
                bytes_done = status.bytes_done,
                bytes_total = status.bytes_total,
                rate = status.download_rate,
                "acquisition progress"
            );
            progress(status.progress());

            if let AcquisitionState::Failed { message } = status.state {
                return Err(AcquisitionError::Failed {
                    manifest: manifest.to_path_buf(),
                    message,
                });
            }
            if status.is_complete() {
                let payload = status
                    .payload
                    .filter(|payload| !payload.as_os_str().is_empty())
                    .ok_or_else(|| AcquisitionError::MissingPayload {
                        manifest: manifest.to_path_buf(),
                    })?;
                let located = relative_to_cwd(&destination.join(payload));
                info!(job = %handle.id, payload = %located.display(), "acquisition complete");
                return Ok(located);
            }
        }
    }

    async fn abandon(&self, handle: &SwarmHandle) {
        if let Err(err) = self.engine.abandon(handle).await {
            warn!(job = %handle.id, error = %format!("{err:#}"), "failed to abandon swarm job");
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn relative_to_cwd(path: &Path) -> PathBuf {
    let Ok(cwd) = std::env::current_dir() else {
        return path.to_path_buf();
    };
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    match absolute.strip_prefix(&cwd) {
        Ok(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
        Ok(relative) => relative.to_path_buf(),
        Err(_) => absolute,
    }
}
