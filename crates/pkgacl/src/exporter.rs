//! The export facade: the single entry point external callers use.

use std::sync::Arc;

use bytes::Bytes;
use pkgacl_export::{Consumer, ExportConfig, ExportTarget, Format};
use pkgacl_store::OwnershipStore;
use tracing::warn;

use crate::cache::ExportCache;
use crate::error::Result;

/// One finished export: the rendered bytes and their HTTP content type.
#[derive(Debug, Clone)]
pub struct Export {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

/// The export facade.
///
/// Validates the requested target, delegates to the cache, and runs the
/// reader/aggregator/renderer pipeline on a miss. Concurrent callers are
/// safe; the administrative layer calls [`invalidate`](Self::invalidate)
/// after every committed ownership write.
pub struct Exporter<S: OwnershipStore> {
    store: Arc<S>,
    cache: ExportCache,
    config: ExportConfig,
}

impl<S: OwnershipStore> Exporter<S> {
    /// Create a facade over a store with the given rendering config.
    pub fn new(store: S, config: ExportConfig) -> Self {
        Self {
            store: Arc::new(store),
            cache: ExportCache::new(),
            config,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The cache, exposed for generation inspection.
    pub fn cache(&self) -> &ExportCache {
        &self.cache
    }

    /// Render (or serve the cached rendering of) one export target.
    ///
    /// When recomputation fails against an unreachable store, a rendering
    /// from a previous generation is served if one exists; with a cold
    /// cache the error propagates.
    pub async fn export(&self, consumer: Consumer, format: Format) -> Result<Export> {
        let target = ExportTarget::new(consumer, format);
        let bytes = match self
            .cache
            .get_or_compute(target, || self.compute(target))
            .await
        {
            Ok(bytes) => bytes,
            Err(err) => match self.cache.get_stale(target) {
                Some(bytes) => {
                    warn!(%target, error = %err, "serving stale rendering, recomputation failed");
                    bytes
                }
                None => return Err(err),
            },
        };
        Ok(Export {
            bytes,
            content_type: format.content_type(),
        })
    }

    /// [`export`](Self::export) with string identifiers, e.g. from a
    /// query string. Fails with `UnknownTarget` outside the closed matrix.
    pub async fn export_named(&self, consumer: &str, format: &str) -> Result<Export> {
        let target = ExportTarget::parse(consumer, format)?;
        self.export(target.consumer, target.format).await
    }

    /// Discard all cached renderings. Called after every committed
    /// ownership write.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    async fn compute(&self, target: ExportTarget) -> Result<Bytes> {
        let graph = self.store.read_graph().await?;
        Ok(Bytes::from(pkgacl_export::render(
            &graph,
            target,
            &self.config,
        )))
    }
}
