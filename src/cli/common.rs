//! Shared CLI plumbing: exit codes and the command error type.

use std::fmt;

/// Process exit codes returned by CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Input rejected (bad script, bad config, failed step)
    ValidationFailed = 1,
    /// File system or serialization failure
    IoError = 2,
}

impl ExitCode {
    /// The numeric process status.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by CLI command handlers.
#[derive(Debug)]
pub struct CliError {
    kind: ExitCode,
    message: String,
}

impl CliError {
    /// Rejected input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::ValidationFailed,
            message: message.into(),
        }
    }

    /// File system failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::IoError,
            message: message.into(),
        }
    }

    /// Exit status the process should end with.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.kind.code()
    }

    /// The error category.
    #[must_use]
    pub fn kind(&self) -> ExitCode {
        self.kind
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::validation(format!("{err:#}"))
    }
}

/// Result alias for CLI handlers.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("bad").exit_code(), 1);
        assert_eq!(CliError::io("disk").exit_code(), 2);
        assert_eq!(ExitCode::Success.code(), 0);
    }

    #[test]
    fn test_anyhow_errors_keep_their_context() {
        let err = anyhow::anyhow!("inner").context("outer");
        let cli: CliError = err.into();
        assert_eq!(cli.kind(), ExitCode::ValidationFailed);
        assert_eq!(cli.to_string(), "outer: inner");
    }
}
