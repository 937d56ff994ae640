// ============================================================================
// rightprops-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Provides a fluent API for creating CoreConfig instances. Every field has a
// default except the lookup directory, which falls back to the current
// directory when never set.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::CoreConfig;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use rightprops_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .lookup_dir(PathBuf::from("/path/to/media"))
///     .probe_missing_props(false)
///     .build();
///
/// assert!(!config.probe_missing_props);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    // Required fields
    lookup_dir: Option<PathBuf>,

    // Optional fields with defaults
    ffprobe_bin: PathBuf,
    probe_missing_props: bool,
    recursive: bool,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self {
            lookup_dir: None,
            ffprobe_bin: PathBuf::from(super::DEFAULT_FFPROBE_BIN),
            probe_missing_props: true,
            recursive: true,
        }
    }

    /// Sets the directory to collect properties from.
    pub fn lookup_dir(mut self, lookup_dir: PathBuf) -> Self {
        self.lookup_dir = Some(lookup_dir);
        self
    }

    /// Overrides the ffprobe executable.
    pub fn ffprobe_bin(mut self, ffprobe_bin: impl Into<PathBuf>) -> Self {
        self.ffprobe_bin = ffprobe_bin.into();
        self
    }

    /// Enables or disables probing of missing video properties.
    pub fn probe_missing_props(mut self, enabled: bool) -> Self {
        self.probe_missing_props = enabled;
        self
    }

    /// Enables or disables traversal of subdirectories.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Builds the CoreConfig.
    pub fn build(self) -> CoreConfig {
        CoreConfig {
            lookup_dir: self.lookup_dir.unwrap_or_else(|| PathBuf::from(".")),
            ffprobe_bin: self.ffprobe_bin,
            probe_missing_props: self.probe_missing_props,
            recursive: self.recursive,
        }
    }
}
