//! Error types for the rightprops-core library.
//!
//! Every fallible operation in the crate returns [`CoreResult`]. The variants
//! group into configuration errors (bad lookup path), external tool errors
//! (ffprobe could not start, failed, or produced unparseable output),
//! structural anomalies in a prober response, and cancellation.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for rightprops-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("The path you provided, '{}', isn't a folder", .0.display())]
    NotADirectory(PathBuf),

    #[error("Required external dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, std::io::Error),

    #[error("Command '{0}' failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Unexpected media structure in '{}': {reason}", path.display())]
    StructuralAnomaly { path: PathBuf, reason: String },

    #[error("Failed to retrieve properties of '{}': {reason}", path.display())]
    PropertySource { path: PathBuf, reason: String },

    #[error("Background task failed: {0}")]
    TaskJoin(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for rightprops-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

impl CoreError {
    /// Returns true if this error only reports that the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}
