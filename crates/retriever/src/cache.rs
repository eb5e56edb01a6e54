use crate::error::Result;
use coach_vector_store::SearchIndex;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;

static SHARED: Lazy<Arc<IndexCache>> = Lazy::new(|| Arc::new(IndexCache::new()));

/// One cached index and the moment it was produced.
#[derive(Default)]
struct Slot {
    index: Option<Arc<SearchIndex>>,
    built_at: Option<Instant>,
}

impl Slot {
    fn fresh(&self, ttl: Duration) -> Option<Arc<SearchIndex>> {
        let index = self.index.as_ref()?;
        let built_at = self.built_at?;
        (built_at.elapsed() < ttl).then(|| Arc::clone(index))
    }
}

type SlotHandle = Arc<AsyncMutex<Slot>>;

/// In-memory index cache keyed by index directory.
///
/// Each key owns an async lock, so concurrent callers racing on a cold or
/// expired entry coalesce into a single build while callers for other keys
/// proceed untouched. A failed build leaves the slot empty and the next
/// caller tries again.
#[derive(Default)]
pub struct IndexCache {
    slots: Mutex<HashMap<PathBuf, SlotHandle>>,
    builds: AtomicUsize,
}

impl IndexCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache. Retrievers created through
    /// [`Retriever::new`](crate::Retriever::new) share it, so two instances
    /// pointed at the same index directory never build twice.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Return the cached index for `key` if it is younger than `ttl`,
    /// otherwise run `build` and cache its result.
    pub async fn get_or_build<F, Fut>(
        &self,
        key: &Path,
        ttl: Duration,
        build: F,
    ) -> Result<Arc<SearchIndex>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SearchIndex>>,
    {
        let slot = self.slot_for(key);
        let mut guard = slot.lock().await;

        if let Some(index) = guard.fresh(ttl) {
            log::debug!("Index cache hit for {}", key.display());
            return Ok(index);
        }

        self.builds.fetch_add(1, Ordering::Relaxed);
        let index = Arc::new(build().await?);
        guard.index = Some(Arc::clone(&index));
        guard.built_at = Some(Instant::now());
        Ok(index)
    }

    /// How many times a builder has actually run, failures included. Cache
    /// hits do not count.
    #[must_use]
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    fn slot_for(&self, key: &Path) -> SlotHandle {
        let mut slots = self.slots.lock().expect("cache mutex poisoned");
        Arc::clone(slots.entry(key.to_path_buf()).or_default())
    }
}
