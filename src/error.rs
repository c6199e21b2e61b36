//! Error types for the sprint tracker.
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (rejected input, unknown task reference)
//! - 4: Operation failed (filesystem or serialisation error)

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes for the `sprint` binary.
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for sprint operations.
#[derive(Error, Debug)]
pub enum Error {
    // Validation rejections (exit code 2)
    #[error("Task name cannot be empty")]
    EmptyName,

    #[error("A due date is required to create a task")]
    MissingDueDate,

    #[error("Estimate must be a positive number, got {0}")]
    InvalidEstimate(f64),

    #[error("Axis length must be at least 1 day, got {0}")]
    InvalidAxisLength(i64),

    #[error("Unrecognised date '{0}'. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'.")]
    InvalidDate(String),

    #[error("{0}")]
    TaskResolution(String),

    #[error("Task id {0} appears more than once")]
    DuplicateId(u64),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No task ids left to assign")]
    IdsExhausted,

    #[error("Corrupt task snapshot in {path}: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },
}

impl Error {
    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::EmptyName
            | Error::MissingDueDate
            | Error::InvalidEstimate(_)
            | Error::InvalidAxisLength(_)
            | Error::InvalidDate(_)
            | Error::TaskResolution(_)
            | Error::DuplicateId(_) => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::IdsExhausted
            | Error::CorruptSnapshot { .. } => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for sprint operations.
pub type Result<T> = std::result::Result<T, Error>;
