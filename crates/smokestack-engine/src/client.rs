use crate::engine::{EngineError, fmt_code};
use crate::executor::{CommandOutput, ContainerExecutor, ProcessExecutor};
use crate::status::StopOutcome;

/// Container engine operations, parameterized over the executor for testability.
pub struct EngineClient<E: ContainerExecutor = ProcessExecutor> {
    executor: E,
}

impl EngineClient<ProcessExecutor> {
    /// Client for the engine executable `program` (e.g. `docker`).
    pub fn new(program: &str) -> Self {
        Self {
            executor: ProcessExecutor::new(program),
        }
    }
}

impl Default for EngineClient<ProcessExecutor> {
    fn default() -> Self {
        Self {
            executor: ProcessExecutor::default(),
        }
    }
}

impl<E: ContainerExecutor> EngineClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Lifecycle ──

    /// Start a detached, named container with one published port.
    ///
    /// Returns the container id printed by the engine.
    pub async fn run_detached(
        &self,
        name: &str,
        image: &str,
        port_mapping: &str,
    ) -> Result<String, RunError> {
        let output = self
            .executor
            .exec(&args([
                "run",
                "--detach",
                "--name",
                name,
                "--publish",
                port_mapping,
                image,
            ]))
            .await
            .map_err(|e| RunError::Engine { source: e })?;

        if !output.success() {
            return Err(RunError::Failed {
                image: image.to_owned(),
                code: output.code,
                stderr: output.stderr.trim().to_owned(),
            });
        }

        Ok(output.stdout.trim().to_owned())
    }

    pub async fn stop(&self, id: &str) -> Result<StopOutcome, EngineError> {
        let output = self.executor.exec(&args(["stop", id])).await?;
        Ok(StopOutcome::from_exit_code(output.code))
    }

    pub async fn kill(&self, id: &str) -> Result<StopOutcome, EngineError> {
        let output = self.executor.exec(&args(["kill", id])).await?;
        Ok(StopOutcome::from_exit_code(output.code))
    }

    /// Remove a stopped container. The raw output is returned so callers can
    /// decide whether a non-zero status matters.
    pub async fn remove(&self, id: &str) -> Result<CommandOutput, EngineError> {
        self.executor.exec(&args(["rm", id])).await
    }

    /// Remove a container whether or not it is running.
    pub async fn force_remove(&self, id: &str) -> Result<CommandOutput, EngineError> {
        self.executor.exec(&args(["rm", "--force", id])).await
    }

    // ── Diagnostics ──

    /// Engine version string, e.g. `27.3.1`.
    pub async fn version(&self) -> Result<String, EngineError> {
        let cmd = args(["version", "--format", "{{.Client.Version}}"]);
        let output = self.executor.exec(&cmd).await?;

        if !output.success() {
            return Err(EngineError::CommandFailed {
                args: cmd,
                code: output.code,
                stderr: output.stderr.trim().to_owned(),
            });
        }

        Ok(output.stdout.trim().to_owned())
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to launch container engine")]
    Engine { source: EngineError },

    #[error("container from image '{image}' failed to start (exit code: {})\n{stderr}", fmt_code(*code))]
    Failed {
        image: String,
        code: Option<i32>,
        stderr: String,
    },
}
