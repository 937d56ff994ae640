//! Retrieval of the platform properties that seed every file's map.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use infer::MatcherType;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::{
    PropertyMap, CONTENT_TYPE_KEY, DATE_MODIFIED_KEY, FILE_EXTENSION_KEY, FILE_NAME_KEY,
    ITEM_FOLDER_PATH_KEY, ITEM_NAME_KEY, ITEM_PATH_KEY, PERCEIVED_TYPE_KEY, SIZE_KEY,
};
use crate::error::{CoreError, CoreResult};
use crate::utils::get_filename_safe;

/// Supplies the initial property map of a file.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Returns every property the platform knows about `path`.
    ///
    /// Fails with [`CoreError::Cancelled`] if `cancel` fires first.
    async fn properties(&self, path: &Path, cancel: &CancellationToken)
    -> CoreResult<PropertyMap>;
}

/// Property source backed by filesystem metadata and magic-byte sniffing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPropertySource;

#[async_trait]
impl PropertySource for FsPropertySource {
    async fn properties(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> CoreResult<PropertyMap> {
        let owned = path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || read_properties(&owned));

        tokio::select! {
            _ = cancel.cancelled() => Err(CoreError::Cancelled),
            joined = task => joined.map_err(|e| CoreError::TaskJoin(e.to_string()))?,
        }
    }
}

fn read_properties(path: &Path) -> CoreResult<PropertyMap> {
    let source_error = |reason: String| CoreError::PropertySource {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| source_error(e.to_string()))?;
    let file_name = get_filename_safe(path)?;

    let mut map = PropertyMap::new();
    map.insert(ITEM_NAME_KEY, file_name.clone());
    map.insert(FILE_NAME_KEY, file_name);
    map.insert(ITEM_PATH_KEY, path.display().to_string());
    if let Some(parent) = path.parent() {
        map.insert(ITEM_FOLDER_PATH_KEY, parent.display().to_string());
    }
    if let Some(extension) = path.extension() {
        map.insert(
            FILE_EXTENSION_KEY,
            format!(".{}", extension.to_string_lossy()),
        );
    }
    map.insert(SIZE_KEY, metadata.len());
    if let Ok(modified) = metadata.modified() {
        let modified: DateTime<Local> = modified.into();
        map.insert(DATE_MODIFIED_KEY, modified.to_rfc3339());
    }

    let sniffed = infer::get_from_path(path).map_err(|e| source_error(e.to_string()))?;
    let perceived = match sniffed {
        Some(kind) => {
            map.insert(CONTENT_TYPE_KEY, kind.mime_type());
            perceived_type(kind.matcher_type())
        }
        None => 0,
    };
    map.insert(PERCEIVED_TYPE_KEY, perceived);

    Ok(map)
}

/// Maps a sniffed content family to the platform's perceived-type code.
fn perceived_type(matcher: MatcherType) -> i64 {
    match matcher {
        MatcherType::Text => 1,
        MatcherType::Image => 2,
        MatcherType::Audio => 3,
        MatcherType::Video => 4,
        MatcherType::Archive => 5,
        MatcherType::Doc | MatcherType::Book => 6,
        MatcherType::App => 8,
        _ => 0,
    }
}
