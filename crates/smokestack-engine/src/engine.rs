#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("container engine `{program}` could not be started — is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("container engine command failed: {args:?} (exit code: {})\n{stderr}", fmt_code(*code))]
    CommandFailed {
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },
}

/// Render an exit code, `None` meaning the process was killed by a signal.
pub(crate) fn fmt_code(code: Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "terminated by signal".to_owned(),
    }
}
