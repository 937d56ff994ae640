//! Directory traversal and per-file collection.
//!
//! [`PropertyCollector`] walks the lookup directory and spawns one task per
//! file and one per subdirectory. Each file task retrieves the file's
//! platform properties, reconciles video files against ffprobe and appends
//! the finished map to a shared [`ResultSet`].
//!
//! The first failure anywhere cancels the run. Outstanding tasks unwind at
//! their next suspension point, running ffprobe processes are killed, and
//! the recorded failure is returned. Results collected before the failure
//! are discarded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rightprops_core::config::CoreConfigBuilder;
//! use rightprops_core::discovery::PropertyCollector;
//! use std::path::PathBuf;
//!
//! # async fn run() -> rightprops_core::CoreResult<()> {
//! let config = CoreConfigBuilder::new()
//!     .lookup_dir(PathBuf::from("/path/to/media"))
//!     .build();
//! let collector = PropertyCollector::new(config);
//! let maps = collector.collect().await?;
//! println!("Collected {} files", maps.len());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfprobeExecutor, TokioFfprobeExecutor};
use crate::properties::{FsPropertySource, PropertyMap, PropertySource, is_video};
use crate::reconcile::reconcile_file;
use crate::utils::format_elapsed;

/// Unordered, append-only collection of finished property maps.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    inner: Arc<Mutex<Vec<PropertyMap>>>,
}

impl ResultSet {
    pub fn push(&self, map: PropertyMap) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(map);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves the collected maps out of the set.
    pub fn take(&self) -> Vec<PropertyMap> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Holds the first failure of a run.
#[derive(Debug, Default)]
struct FailureSlot {
    inner: Mutex<Option<CoreError>>,
}

impl FailureSlot {
    /// Records `err` unless a failure is already present. A cancellation
    /// never replaces a real failure, but a real failure replaces a
    /// cancellation.
    fn record(&self, err: CoreError) {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let replace = match slot.as_ref() {
            None => true,
            Some(existing) => existing.is_cancelled() && !err.is_cancelled(),
        };
        if replace {
            if !err.is_cancelled() {
                log::error!("{}", err);
            }
            *slot = Some(err);
        }
    }

    fn take(&self) -> Option<CoreError> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// State shared by every task of one run.
struct RunContext {
    config: Arc<CoreConfig>,
    source: Arc<dyn PropertySource>,
    executor: Arc<dyn FfprobeExecutor>,
    cancel: CancellationToken,
    results: ResultSet,
    failure: FailureSlot,
}

impl RunContext {
    fn fail(&self, err: CoreError) {
        self.failure.record(err);
        self.cancel.cancel();
    }

    /// Lists `dir` and spawns a task per entry into `tasks`.
    async fn spawn_entries(
        self: &Arc<Self>,
        dir: &Path,
        tasks: &mut JoinSet<()>,
    ) -> CoreResult<()> {
        let mut entries = tokio::select! {
            _ = self.cancel.cancelled() => return Err(CoreError::Cancelled),
            entries = tokio::fs::read_dir(dir) => entries?,
        };

        loop {
            let entry = tokio::select! {
                _ = self.cancel.cancelled() => return Err(CoreError::Cancelled),
                entry = entries.next_entry() => entry?,
            };
            let Some(entry) = entry else {
                break;
            };

            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                if self.config.recursive {
                    tasks.spawn(visit_dir(Arc::clone(self), path));
                } else {
                    log::debug!("Not descending into '{}'", path.display());
                }
            } else if file_type.is_file()
                || (file_type.is_symlink()
                    && tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()))
            {
                tasks.spawn(visit_file(Arc::clone(self), path));
            } else {
                log::debug!("Skipping '{}': not a regular file", path.display());
            }
        }

        Ok(())
    }

    async fn process_file(&self, path: &Path) -> CoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let mut map = self.source.properties(path, &self.cancel).await?;

        if self.config.probe_missing_props {
            if is_video(&map) {
                reconcile_file(self.executor.as_ref(), path, &mut map, &self.cancel).await?;
            } else {
                log::info!("Skipping probe of non-video file '{}'", path.display());
            }
        }

        self.results.push(map);
        Ok(())
    }
}

type Unit = Pin<Box<dyn Future<Output = ()> + Send>>;

fn visit_dir(ctx: Arc<RunContext>, dir: PathBuf) -> Unit {
    Box::pin(async move {
        let mut tasks = JoinSet::new();
        if let Err(err) = ctx.spawn_entries(&dir, &mut tasks).await {
            ctx.fail(err);
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                ctx.fail(CoreError::TaskJoin(err.to_string()));
            }
        }
    })
}

fn visit_file(ctx: Arc<RunContext>, path: PathBuf) -> Unit {
    Box::pin(async move {
        if let Err(err) = ctx.process_file(&path).await {
            ctx.fail(err);
        }
    })
}

/// Collects the property maps of every file under a directory.
pub struct PropertyCollector {
    config: Arc<CoreConfig>,
    source: Arc<dyn PropertySource>,
    executor: Arc<dyn FfprobeExecutor>,
    cancel: CancellationToken,
}

impl PropertyCollector {
    /// Creates a collector using the filesystem property source and the
    /// ffprobe binary named in `config`.
    pub fn new(config: CoreConfig) -> Self {
        let executor = TokioFfprobeExecutor::new(config.ffprobe_bin.clone());
        Self::with_components(config, Arc::new(FsPropertySource), Arc::new(executor))
    }

    pub fn with_components(
        config: CoreConfig,
        source: Arc<dyn PropertySource>,
        executor: Arc<dyn FfprobeExecutor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            executor,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that cancels the run when triggered, e.g. on Ctrl-C.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Walks the lookup directory and returns one map per file, in no
    /// particular order.
    ///
    /// # Errors
    ///
    /// Returns the configuration error for an invalid lookup directory, or
    /// the first failure of the run. [`CoreError::Cancelled`] is returned
    /// only when the run was cancelled without any other failure.
    pub async fn collect(&self) -> CoreResult<Vec<PropertyMap>> {
        self.config.validate()?;

        let start = Instant::now();
        let ctx = Arc::new(RunContext {
            config: Arc::clone(&self.config),
            source: Arc::clone(&self.source),
            executor: Arc::clone(&self.executor),
            cancel: self.cancel.clone(),
            results: ResultSet::default(),
            failure: FailureSlot::default(),
        });

        log::info!("Collecting properties under '{}'", self.config.lookup_dir.display());
        visit_dir(Arc::clone(&ctx), self.config.lookup_dir.clone()).await;

        if let Some(err) = ctx.failure.take() {
            let discarded = ctx.results.take().len();
            if discarded > 0 {
                log::debug!("Discarding {} collected result(s)", discarded);
            }
            return Err(err);
        }

        let results = ctx.results.take();
        log::info!(
            "Collected properties of {} file(s) in {}",
            results.len(),
            format_elapsed(start.elapsed())
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_slot_first_real_failure_wins() {
        let slot = FailureSlot::default();
        slot.record(CoreError::Cancelled);
        slot.record(CoreError::OperationFailed("first".into()));
        slot.record(CoreError::OperationFailed("second".into()));
        slot.record(CoreError::Cancelled);

        match slot.take() {
            Some(CoreError::OperationFailed(msg)) => assert_eq!(msg, "first"),
            other => panic!("unexpected slot content: {:?}", other),
        }
    }

    #[test]
    fn test_result_set_take_empties() {
        let set = ResultSet::default();
        set.push(PropertyMap::new());
        set.push(PropertyMap::new());
        assert_eq!(set.len(), 2);
        assert_eq!(set.take().len(), 2);
        assert!(set.is_empty());
    }
}
