//! Error context for the command line front end.
//!
//! Failures reported to the user are core errors with a short description of
//! what the CLI was doing prepended, e.g.
//! `Operation failed: Failed to write results: I/O error: disk full`.

use rightprops_core::{CoreError, CoreResult};
use std::fmt::Display;

pub type CliResult<T> = CoreResult<T>;

/// Prepends what the CLI was doing to a failed result.
pub trait CliErrorContext<T> {
    fn cli_context(self, context: impl Display) -> CliResult<T>;

    /// Like [`cli_context`](Self::cli_context), building the text only on error.
    fn cli_with_context<C: Display>(self, context: impl FnOnce() -> C) -> CliResult<T>;
}

fn with_context(context: impl Display, err: impl Into<CoreError>) -> CoreError {
    CoreError::OperationFailed(format!("{}: {}", context, err.into()))
}

impl<T, E: Into<CoreError>> CliErrorContext<T> for Result<T, E> {
    fn cli_context(self, context: impl Display) -> CliResult<T> {
        self.map_err(|e| with_context(context, e))
    }

    fn cli_with_context<C: Display>(self, context: impl FnOnce() -> C) -> CliResult<T> {
        self.map_err(|e| with_context(context(), e))
    }
}
