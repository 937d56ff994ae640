// ============================================================================
// rightprops-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Logger Setup and Timestamps
//
// The application logs through the standard `log` facade. This module
// configures `env_logger` as the backend with a compact colored format and
// the level chosen on the command line.

use log::LevelFilter;
use owo_colors::OwoColorize;
use std::io::Write;

/// Initializes env_logger at `level`. `LevelFilter::Off` silences all output.
pub fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            let level = match record.level() {
                log::Level::Error => "ERROR".bright_red().to_string(),
                log::Level::Warn => "WARN ".yellow().to_string(),
                log::Level::Info => "INFO ".green().to_string(),
                log::Level::Debug => "DEBUG".blue().to_string(),
                log::Level::Trace => "TRACE".magenta().to_string(),
            };
            writeln!(buf, "{} {} {}", timestamp.dimmed(), level, record.args())
        })
        .filter(None, level)
        .init();

    log::debug!("Logger initialized with level: {}", level);
}

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// use rightprops_cli::logging::get_timestamp;
///
/// let file_name = format!("props.{}.json", get_timestamp());
/// assert_eq!(file_name.len(), "props.20240601_123045.json".len());
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
