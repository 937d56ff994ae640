//! Command implementations for the CLI.

/// Module containing the property collection run.
pub mod collect;
