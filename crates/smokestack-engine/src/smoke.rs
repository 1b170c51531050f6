//! Start a container, check that it answers HTTP, and always tear it down.
//!
//! ```text
//! smokestack smoke <image>
//!   1. Clear       ── rm --force <name>      (leftovers from an earlier run; errors ignored)
//!   2. Start       ── run --detach --name <name> --publish H:C <image>
//!   3. Readiness   ── poll until the warm-up deadline, or sleep the whole warm-up
//!   4. Probe       ── GET <url> with Host: <host_header>
//!   5. Release     ── stop + rm <name>       (every exit path after step 2)
//! ```
//!
//! Step 5 also runs when the shutdown future passed to
//! [`SmokeTester::run_until`] resolves during steps 3 and 4, and before a
//! panic in those steps is resumed.
//!
//! The container name and host port are fixed by configuration, so two smoke
//! tests with the same settings must not run at the same time.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use smokestack_core::{ImageRef, ReadinessStrategy, SmokeConfig};
use tokio::time::Instant;

use crate::client::RunError;
use crate::executor::{ContainerExecutor, ProcessExecutor};
use crate::probe::{HttpProbe, ProbeError, ProbeResponse, ReqwestProbe};
use crate::reaper::{ReapError, ReapOutcome, Reaper};

/// Outcome of a passing smoke test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeReport {
    pub image: String,
    pub container_id: String,
    pub status: u16,
    pub body: String,
    pub cleanup: ReapOutcome,
}

pub struct SmokeTester<E: ContainerExecutor = ProcessExecutor, P: HttpProbe = ReqwestProbe> {
    reaper: Reaper<E>,
    probe: P,
    settings: SmokeConfig,
}

impl<E: ContainerExecutor, P: HttpProbe> SmokeTester<E, P> {
    pub fn new(reaper: Reaper<E>, probe: P, settings: SmokeConfig) -> Self {
        Self {
            reaper,
            probe,
            settings,
        }
    }

    pub async fn run(&self, image: &ImageRef) -> Result<SmokeReport, SmokeError> {
        self.run_until(image, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but stop waiting for the server as soon as
    /// `shutdown` resolves. The container is still released before returning
    /// [`SmokeError::Interrupted`].
    pub async fn run_until(
        &self,
        image: &ImageRef,
        shutdown: impl Future<Output = ()>,
    ) -> Result<SmokeReport, SmokeError> {
        let name = self.settings.container_name.as_str();

        self.clear_leftover(name).await;

        tracing::info!(
            %image,
            container = name,
            ports = %self.settings.port_mapping(),
            "starting container"
        );
        let container_id = self
            .reaper
            .client()
            .run_detached(name, image.as_str(), &self.settings.port_mapping())
            .await
            .map_err(|e| SmokeError::Start { source: e })?;

        let (probed, released) = self
            .with_container(name, self.await_response(), shutdown)
            .await;

        let Some(probed) = probed else {
            let cleanup = match released {
                Ok(_) => None,
                Err(e) => Some(e),
            };
            return Err(SmokeError::Interrupted {
                container: name.to_owned(),
                cleanup,
            });
        };

        match (probed, released) {
            (Ok(response), Ok(cleanup)) => {
                tracing::info!(status = response.status, "smoke test passed");
                Ok(SmokeReport {
                    image: image.to_string(),
                    container_id,
                    status: response.status,
                    body: response.body,
                    cleanup,
                })
            }
            (Ok(_), Err(e)) => Err(SmokeError::Cleanup {
                container: name.to_owned(),
                source: e,
            }),
            (Err(source), Ok(_)) => Err(SmokeError::Probe {
                source,
                cleanup: None,
            }),
            (Err(source), Err(e)) => {
                tracing::error!(
                    container = name,
                    error = %e,
                    "cleanup after failed probe also failed"
                );
                Err(SmokeError::Probe {
                    source,
                    cleanup: Some(e),
                })
            }
        }
    }

    /// Run `body` while the container is up, then reap the container
    /// regardless of what `body` produced.
    ///
    /// Yields `None` when `shutdown` wins the race. A panic in `body` is
    /// resumed once the container has been reaped.
    async fn with_container<T>(
        &self,
        name: &str,
        body: impl Future<Output = T>,
        shutdown: impl Future<Output = ()>,
    ) -> (Option<T>, Result<ReapOutcome, ReapError>) {
        let finished = tokio::select! {
            finished = AssertUnwindSafe(body).catch_unwind() => Some(finished),
            () = shutdown => {
                tracing::warn!(container = name, "interrupted, releasing container");
                None
            }
        };

        tracing::info!(container = name, "releasing container");
        let released = self.reaper.reap(name).await;

        match finished {
            Some(Ok(value)) => (Some(value), released),
            Some(Err(panic)) => {
                if let Err(e) = &released {
                    tracing::error!(container = name, error = %e, "cleanup after panic failed");
                }
                std::panic::resume_unwind(panic)
            }
            None => (None, released),
        }
    }

    async fn clear_leftover(&self, name: &str) {
        match self.reaper.client().force_remove(name).await {
            Ok(out) if out.success() => {
                tracing::info!(container = name, "removed leftover container");
            }
            Ok(out) => {
                tracing::debug!(container = name, code = ?out.code, "no leftover container");
            }
            Err(e) => {
                tracing::warn!(container = name, error = %e, "could not clear leftover container");
            }
        }
    }

    async fn await_response(&self) -> Result<ProbeResponse, ProbeError> {
        let s = &self.settings;

        match s.readiness {
            ReadinessStrategy::Fixed => {
                tracing::info!(warmup = ?s.warmup(), "waiting for container to warm up");
                tokio::time::sleep(s.warmup()).await;
                self.probe.get(&s.url, &s.host_header).await
            }
            ReadinessStrategy::Poll => {
                let deadline = Instant::now() + s.warmup();
                let mut attempt = 1u32;
                loop {
                    match self.probe.get(&s.url, &s.host_header).await {
                        Err(e) if e.is_retryable() && Instant::now() < deadline => {
                            tracing::debug!(attempt, error = %e, "server not ready yet");
                            let remaining = deadline.saturating_duration_since(Instant::now());
                            tokio::time::sleep(s.poll_interval().min(remaining)).await;
                            attempt += 1;
                        }
                        result => return result,
                    }
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SmokeError {
    #[error("container did not start")]
    Start { source: RunError },

    #[error("smoke test failed{}", cleanup_note(cleanup))]
    Probe {
        source: ProbeError,
        cleanup: Option<ReapError>,
    },

    #[error("smoke test of container '{container}' interrupted{}", cleanup_note(cleanup))]
    Interrupted {
        container: String,
        cleanup: Option<ReapError>,
    },

    #[error("smoke test passed but container '{container}' could not be cleaned up")]
    Cleanup {
        container: String,
        source: ReapError,
    },
}

fn cleanup_note(cleanup: &Option<ReapError>) -> String {
    match cleanup {
        Some(e) => format!(" (cleanup also failed: {e})"),
        None => String::new(),
    }
}
