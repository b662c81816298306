//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the scancheck application.
///
/// - 0: Success (every roster code scanned, or nothing to check against)
/// - 1: General error (unexpected failure)
/// - 2: Incomplete (input ended with roster codes still unscanned)
/// - 3: No roster (scanning ran without a usable roster)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Roster fully scanned or command completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Incomplete: Input ended before every roster code was scanned.
    Incomplete = 2,
    /// No roster: Scans were checked against an empty roster.
    NoRoster = 3,
    /// Interrupted: Scanning was interrupted by user (Ctrl+C).
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
            Self::Success => "SC000",
            Self::GeneralError => "SC001",
            Self::Incomplete => "SC002",
            Self::NoRoster => "SC003",
            Self::Interrupted => "SC130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "SC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
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
