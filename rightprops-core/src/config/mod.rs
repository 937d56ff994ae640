//! Configuration structures and constants for the rightprops-core library.
//!
//! The collector never reads process-wide state: everything that toggles its
//! behavior is carried by a [`CoreConfig`] value handed to it at construction.

mod builder;

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

/// Default executable used to probe media files.
pub const DEFAULT_FFPROBE_BIN: &str = "ffprobe";

/// Main configuration structure for the rightprops-core library.
///
/// Typically created by the consumer of the library (e.g., rightprops-cli)
/// through [`CoreConfigBuilder`] and passed to
/// [`PropertyCollector`](crate::discovery::PropertyCollector).
///
/// # Examples
///
/// ```rust,no_run
/// use rightprops_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .lookup_dir(PathBuf::from("/path/to/media"))
///     .ffprobe_bin("/usr/local/bin/ffprobe")
///     .recursive(false)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory whose files are collected
    pub lookup_dir: PathBuf,

    /// Executable invoked to probe media files
    pub ffprobe_bin: PathBuf,

    /// Whether missing video properties are retrieved through ffprobe
    pub probe_missing_props: bool,

    /// Whether subdirectories are traversed
    pub recursive: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            lookup_dir: PathBuf::from("."),
            ffprobe_bin: PathBuf::from(DEFAULT_FFPROBE_BIN),
            probe_missing_props: true,
            recursive: true,
        }
    }
}

impl CoreConfig {
    /// Creates a configuration for `lookup_dir` with every other field defaulted.
    pub fn new(lookup_dir: PathBuf) -> Self {
        Self {
            lookup_dir,
            ..Default::default()
        }
    }

    /// Checks that the lookup directory exists and is a directory.
    pub fn validate(&self) -> CoreResult<()> {
        let metadata = std::fs::metadata(&self.lookup_dir).map_err(|e| {
            CoreError::PathError(format!(
                "Failed to access lookup path '{}': {}",
                self.lookup_dir.display(),
                e
            ))
        })?;

        if !metadata.is_dir() {
            return Err(CoreError::NotADirectory(self.lookup_dir.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::new(PathBuf::from("/media"));
        assert_eq!(config.ffprobe_bin, PathBuf::from("ffprobe"));
        assert!(config.probe_missing_props);
        assert!(config.recursive);
    }

    #[test]
    fn test_validate_rejects_file_and_missing_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("clip.mp4");
        File::create(&file_path).unwrap();

        assert!(CoreConfig::new(dir.path().to_path_buf()).validate().is_ok());
        assert!(matches!(
            CoreConfig::new(file_path).validate(),
            Err(CoreError::NotADirectory(_))
        ));
        assert!(matches!(
            CoreConfig::new(dir.path().join("missing")).validate(),
            Err(CoreError::PathError(_))
        ));
    }
}
