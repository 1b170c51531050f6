use crate::engine::EngineError;

/// Captured result of one container engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(code: Option<i32>, stdout: &str, stderr: &str) -> Self {
        Self {
            code,
            stdout: stdout.to_owned(),
            stderr: stderr.to_owned(),
        }
    }

    /// Exit code 0 with the given stdout.
    pub fn ok(stdout: &str) -> Self {
        Self::new(Some(0), stdout, "")
    }

    /// Non-zero exit with the given stderr.
    pub fn failed(code: i32, stderr: &str) -> Self {
        Self::new(Some(code), "", stderr)
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstraction over container engine execution for testability.
///
/// Every exit status comes back as `Ok`; callers decide which codes are
/// failures. Only a failure to launch the engine at all is an `Err`.
///
/// Production code uses [`ProcessExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ContainerExecutor: Send + Sync {
    /// Execute an engine command and capture its exit code, stdout and stderr.
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, EngineError>;
}

/// Runs the engine CLI (`docker`, `podman`, ...) as a child process.
pub struct ProcessExecutor {
    program: String,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerExecutor for ProcessExecutor {
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, EngineError> {
        use std::process::Stdio;

        tracing::debug!(program = %self.program, ?args, "running engine command");

        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| EngineError::NotFound {
                program: self.program.clone(),
                source: e,
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(code = ?result.code, "engine command finished");
        Ok(result)
    }
}
