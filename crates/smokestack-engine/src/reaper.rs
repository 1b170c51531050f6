use crate::client::EngineClient;
use crate::engine::{EngineError, fmt_code};
use crate::executor::{ContainerExecutor, ProcessExecutor};
use crate::status::StopOutcome;

/// Engine verb used to bring the container down before removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReapMode {
    /// `stop`: graceful shutdown with the engine's grace period.
    #[default]
    Stop,
    /// `kill`: immediate SIGKILL.
    Kill,
}

/// Successful end state of a reap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// The container existed and was stopped and removed.
    Removed,
    /// No such container; nothing to do.
    AlreadyAbsent,
}

/// Stops and removes containers, treating "no such container" as success.
///
/// Repeated reaps of the same identifier are idempotent: the first call
/// removes the container, later calls see it as already absent.
pub struct Reaper<E: ContainerExecutor = ProcessExecutor> {
    client: EngineClient<E>,
    mode: ReapMode,
    strict_remove: bool,
}

impl<E: ContainerExecutor> Reaper<E> {
    pub fn new(client: EngineClient<E>) -> Self {
        Self {
            client,
            mode: ReapMode::default(),
            strict_remove: false,
        }
    }

    pub fn with_mode(mut self, mode: ReapMode) -> Self {
        self.mode = mode;
        self
    }

    /// Fail the reap when `rm` exits non-zero after a successful stop.
    pub fn with_strict_remove(mut self, strict: bool) -> Self {
        self.strict_remove = strict;
        self
    }

    pub fn client(&self) -> &EngineClient<E> {
        &self.client
    }

    pub async fn reap(&self, id: &str) -> Result<ReapOutcome, ReapError> {
        let outcome = match self.mode {
            ReapMode::Stop => self.client.stop(id).await,
            ReapMode::Kill => self.client.kill(id).await,
        }
        .map_err(|e| ReapError::Engine { source: e })?;

        match outcome {
            StopOutcome::AlreadyAbsent => {
                tracing::debug!(container = id, "container not found, nothing to reap");
                Ok(ReapOutcome::AlreadyAbsent)
            }
            StopOutcome::Failed { code } => Err(ReapError::Stop {
                id: id.to_owned(),
                code,
            }),
            StopOutcome::Stopped => {
                let removed = self
                    .client
                    .remove(id)
                    .await
                    .map_err(|e| ReapError::Engine { source: e })?;

                if !removed.success() {
                    if self.strict_remove {
                        return Err(ReapError::Remove {
                            id: id.to_owned(),
                            code: removed.code,
                            stderr: removed.stderr.trim().to_owned(),
                        });
                    }
                    tracing::warn!(
                        container = id,
                        code = ?removed.code,
                        stderr = removed.stderr.trim(),
                        "container stopped but removal failed; ignoring"
                    );
                }

                tracing::info!(container = id, "container reaped");
                Ok(ReapOutcome::Removed)
            }
        }
    }

    /// Reap each identifier in order, stopping at the first failure.
    pub async fn reap_all<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<(String, ReapOutcome)>, ReapError> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            let outcome = self.reap(id).await?;
            outcomes.push((id.to_owned(), outcome));
        }
        Ok(outcomes)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReapError {
    #[error("failed to stop container '{id}' (exit code: {})", fmt_code(*code))]
    Stop { id: String, code: Option<i32> },

    #[error("container '{id}' stopped but could not be removed (exit code: {})\n{stderr}", fmt_code(*code))]
    Remove {
        id: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to launch container engine")]
    Engine { source: EngineError },
}

impl ReapError {
    /// Exit status reported by the engine, when there is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Stop { code, .. } | Self::Remove { code, .. } => *code,
            Self::Engine { .. } => None,
        }
    }
}
