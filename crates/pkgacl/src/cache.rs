//! Generation-counted memoization of rendered exports.
//!
//! One entry per (consumer, format) target, tagged with the generation
//! observed when its recomputation began. `invalidate` is a single atomic
//! increment: it never blocks readers or in-flight recomputation, and
//! stale entries are overwritten on the next access rather than scanned
//! proactively.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use pkgacl_export::ExportTarget;
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry {
    generation: u64,
    bytes: Bytes,
}

/// The export cache.
///
/// Rendered bytes are held as [`Bytes`] so concurrent readers share one
/// allocation by reference. A per-target async mutex coalesces concurrent
/// misses: recomputation runs at most once per target per generation.
pub struct ExportCache {
    generation: AtomicU64,
    entries: RwLock<HashMap<ExportTarget, CacheEntry>>,
    locks: RwLock<HashMap<ExportTarget, Arc<Mutex<()>>>>,
}

impl ExportCache {
    /// Create an empty cache at generation zero.
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// The current global generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Logically discard every stored rendering. Returns the new generation.
    pub fn invalidate(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "export cache invalidated");
        generation
    }

    /// The cached rendering for `target`, if tagged with the current
    /// generation.
    pub fn get(&self, target: ExportTarget) -> Option<Bytes> {
        let generation = self.generation();
        let entries = self.entries.read().ok()?;
        entries
            .get(&target)
            .filter(|entry| entry.generation == generation)
            .map(|entry| entry.bytes.clone())
    }

    /// The cached rendering for `target` regardless of generation.
    ///
    /// This is the stale fallback: served when recomputation fails against
    /// an unreachable store.
    pub fn get_stale(&self, target: ExportTarget) -> Option<Bytes> {
        let entries = self.entries.read().ok()?;
        entries.get(&target).map(|entry| entry.bytes.clone())
    }

    /// Return the current rendering, recomputing through `compute` on a
    /// miss.
    ///
    /// The entry is tagged with the generation observed *before* `compute`
    /// runs, so an invalidation that lands mid-computation correctly
    /// strands the stored result as stale. A failing `compute` propagates
    /// its error and leaves any previous entry untouched.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        target: ExportTarget,
        compute: F,
    ) -> std::result::Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Bytes, E>>,
    {
        if let Some(bytes) = self.get(target) {
            return Ok(bytes);
        }

        let lock = self.key_lock(target);
        let _guard = lock.lock().await;

        // Another task may have filled the entry while we waited.
        if let Some(bytes) = self.get(target) {
            return Ok(bytes);
        }

        let generation = self.generation();
        debug!(%target, generation, "recomputing export");
        let bytes = compute().await?;

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                target,
                CacheEntry {
                    generation,
                    bytes: bytes.clone(),
                },
            );
        }
        Ok(bytes)
    }

    fn key_lock(&self, target: ExportTarget) -> Arc<Mutex<()>> {
        if let Ok(locks) = self.locks.read() {
            if let Some(lock) = locks.get(&target) {
                return lock.clone();
            }
        }
        match self.locks.write() {
            Ok(mut locks) => locks
                .entry(target)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
            // Poisoned: fall back to an uncoalesced private lock. The
            // cache stays correct, only the thundering-herd bound is lost.
            Err(_) => Arc::new(Mutex::new(())),
        }
    }
}

impl Default for ExportCache {
    fn default() -> Self {
        Self::new()
    }
}
