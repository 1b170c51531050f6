//! Translation of container engine exit statuses.
//!
//! The engine reports "no such container" as exit status 125. This module is
//! the only place that number appears; everything else works with
//! [`StopOutcome`].

/// Exit status the container engine uses when the target container does not exist.
pub const NO_SUCH_CONTAINER: i32 = 125;

/// Result of asking the engine to stop (or kill) a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The container was running (or stopped) and is now stopped.
    Stopped,
    /// The engine has no container with that identifier.
    AlreadyAbsent,
    /// Any other status. `code` is `None` when the engine was killed by a signal.
    Failed { code: Option<i32> },
}

impl StopOutcome {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => Self::Stopped,
            Some(NO_SUCH_CONTAINER) => Self::AlreadyAbsent,
            other => Self::Failed { code: other },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
