//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the rpacs-pack application.
///
/// - 0: Success (cases packaged, or report found nothing oversized)
/// - 1: General error (unexpected failure)
/// - 2: Nothing to do (every matching case is already archived)
/// - 3: Oversized (completed, but some archives exceed the upload limit)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: run completed normally.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Nothing to do: no pending cases were found.
    NothingToDo = 2,
    /// Oversized: run completed but archives over the size limit exist.
    Oversized = 3,
    /// Interrupted: run was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RP000",
            Self::GeneralError => "RP001",
            Self::NothingToDo => "RP002",
            Self::Oversized => "RP003",
            Self::Interrupted => "RP130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RP001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including the context chain
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
