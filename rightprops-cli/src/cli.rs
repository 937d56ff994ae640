// rightprops-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "rightprops: media property collector",
    long_about = "Collects the properties of every file under a directory and fills missing \
                  video properties using ffprobe. Results are written to props.<timestamp>.json \
                  in the current directory."
)]
pub struct Cli {
    /// Directory whose files are collected
    #[arg(value_name = "LOOKUP_DIR")]
    pub lookup_dir: PathBuf,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info, value_name = "LEVEL")]
    pub log_level: LogLevel,

    /// ffprobe executable to use (defaults to `ffprobe` on PATH)
    #[arg(long, value_name = "PATH", env = "RIGHTPROPS_FFPROBE")]
    pub ffprobe_bin: Option<PathBuf>,

    /// Do not run ffprobe for video properties the platform could not supply
    #[arg(long)]
    pub no_video_missing_props_probe: bool,

    /// Only collect files directly inside LOOKUP_DIR
    #[arg(long)]
    pub no_recursive: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Silent,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Silent => LevelFilter::Off,
        }
    }
}
