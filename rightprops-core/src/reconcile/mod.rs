//! Reconciliation of a single file's property map against ffprobe.
//!
//! The planner decides which canonical properties are missing, the merger
//! fills them from one JSON pass, and the fallback passes derive whatever
//! ffprobe could not report directly.

pub mod bitrate;
pub mod frame_rate;
pub mod merger;
pub mod planner;
pub mod timing;

use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::error::CoreResult;
use crate::external::FfprobeExecutor;
use crate::properties::PropertyMap;

pub use merger::MergeOutcome;
pub use planner::{PendingProperty, QueryPlan};

/// Fills the missing properties of `map`, the property map of `path`.
///
/// Does nothing when no row of the property table is missing. Fallback
/// passes run concurrently; their values are added once all have finished.
pub async fn reconcile_file(
    executor: &dyn FfprobeExecutor,
    path: &Path,
    map: &mut PropertyMap,
    cancel: &CancellationToken,
) -> CoreResult<()> {
    let plan = planner::plan(map);
    if plan.is_empty() {
        log::debug!("Nothing to probe for '{}'", path.display());
        return Ok(());
    }

    let output = executor.read_to_string(&plan.request(), path, cancel).await?;
    let outcome = merger::merge(path, &plan, &output, map)?;
    if !outcome.needs_fallback() {
        return Ok(());
    }

    let (bitrates, frame_rate) = tokio::try_join!(
        async {
            if outcome.bitrate_fallback.is_empty() {
                Ok(Vec::new())
            } else {
                bitrate::calculate_bitrates(executor, path, &outcome.bitrate_fallback, cancel).await
            }
        },
        async {
            if outcome.frame_rate_fallback {
                frame_rate::calculate_frame_rate(executor, path, cancel).await
            } else {
                Ok(None)
            }
        },
    )?;

    for (key, value) in bitrates.into_iter().chain(frame_rate) {
        map.insert(key, value);
    }

    Ok(())
}
