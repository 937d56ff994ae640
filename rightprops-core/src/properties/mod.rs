//! Property model: the canonical table, the per-file property map and the
//! source that seeds each map from the filesystem.

pub mod map;
pub mod source;
pub mod table;

pub use map::PropertyMap;
pub use source::{FsPropertySource, PropertySource};
pub use table::{PROPERTY_TABLE, PropertySpec, Section, StreamKind, Target};

pub const ITEM_NAME_KEY: &str = "System.ItemNameDisplay";
pub const FILE_NAME_KEY: &str = "System.FileName";
pub const ITEM_PATH_KEY: &str = "System.ItemPathDisplay";
pub const ITEM_FOLDER_PATH_KEY: &str = "System.ItemFolderPathDisplay";
pub const FILE_EXTENSION_KEY: &str = "System.FileExtension";
pub const SIZE_KEY: &str = "System.Size";
pub const DATE_MODIFIED_KEY: &str = "System.DateModified";
pub const CONTENT_TYPE_KEY: &str = "System.ContentType";
pub const PERCEIVED_TYPE_KEY: &str = "System.PerceivedType";

/// `System.PerceivedType` value of video files.
pub const PERCEIVED_TYPE_VIDEO: i64 = 4;

/// Returns true if the map describes a video file: its content type is a
/// `video/*` type or its perceived type is video.
pub fn is_video(map: &PropertyMap) -> bool {
    let by_content_type = map
        .get_str(CONTENT_TYPE_KEY)
        .is_some_and(|content_type| content_type.starts_with("video"));
    let by_perceived_type = map
        .get(PERCEIVED_TYPE_KEY)
        .and_then(|value| value.as_i64())
        == Some(PERCEIVED_TYPE_VIDEO);

    by_content_type || by_perceived_type
}
