// ============================================================================
// rightprops-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffprobe Command-Line Tool
//
// This module encapsulates every interaction with ffprobe. The reconciliation
// engine only sees the FfprobeExecutor trait and builds ProbeRequest values;
// spawning, output streaming and cancellation of the child process live here.
//
// KEY COMPONENTS:
// - ProbeRequest: arguments of a single ffprobe invocation
// - FfprobeExecutor: trait for running a request against one input file
// - TokioFfprobeExecutor: production implementation on tokio::process
// - MockFfprobeExecutor: scripted implementation (feature "test-mocks")
// - Dependency checking

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains the trait and the tokio implementation for running ffprobe
pub mod ffprobe_executor;

/// Contains the argument model of a single ffprobe invocation
pub mod request;

/// Scripted executor for tests
#[cfg(feature = "test-mocks")]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffprobe_executor::{FfprobeExecutor, TokioFfprobeExecutor};
pub use request::{PrintFormat, ProbeRequest};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs the command with `-version` and discards its output.
///
/// # Returns
///
/// * `Ok(())` - If the command could be executed
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd: &Path) -> CoreResult<()> {
    let cmd_name = cmd.display().to_string();

    let result = Command::new(cmd)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(status) if status.success() => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Ok(status) => Err(CoreError::CommandFailed(
            cmd_name,
            status,
            "version check exited unsuccessfully".to_string(),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CoreError::DependencyNotFound(cmd_name))
        }
        Err(e) => Err(CoreError::CommandStart(cmd_name, e)),
    }
}
