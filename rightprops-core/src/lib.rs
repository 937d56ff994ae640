//! Core library for collecting media file properties and reconciling the
//! ones the platform cannot supply with ffprobe.
//!
//! Every file under a lookup directory gets a property map seeded from the
//! filesystem. For video files, canonical properties missing from that map
//! (dimensions, bitrates, frame rate, audio layout, duration) are retrieved
//! through a minimal ffprobe query. Values ffprobe cannot report directly
//! are derived from packet-level passes.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rightprops_core::{CoreConfig, PropertyCollector};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> rightprops_core::CoreResult<()> {
//! let mut config = CoreConfig::new(PathBuf::from("/path/to/media"));
//! config.recursive = false;
//! config.validate()?;
//!
//! let collector = PropertyCollector::new(config);
//! for map in collector.collect().await? {
//!     println!("{:?}", map.get("FFProbe.Video.FrameWidth"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod properties;
pub mod reconcile;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::{PropertyCollector, ResultSet};
pub use error::{CoreError, CoreResult};
pub use external::{FfprobeExecutor, TokioFfprobeExecutor, check_dependency};
pub use properties::{FsPropertySource, PropertyMap, PropertySource};
pub use reconcile::reconcile_file;
pub use utils::{format_duration, format_elapsed};
