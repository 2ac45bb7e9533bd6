//! Shared state for one analysis run

use codescope_ai::RateLimitedInferenceClient;
use codescope_core::{summary_cache_path, ContentCache, Settings};
use codescope_indexer::CallGraphExtractor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything a file task needs, passed explicitly instead of held in
/// globals. The caches are mutated by every task and sit behind locks; the
/// client carries the run's single set of admission gates.
pub struct RunContext {
    pub root: PathBuf,
    pub settings: Settings,
    pub client: RateLimitedInferenceClient,
    pub extractor: CallGraphExtractor,
    pub cache: Mutex<ContentCache>,
    pub summary_cache: Mutex<ContentCache>,
}

impl RunContext {
    pub fn new(
        root: impl Into<PathBuf>,
        settings: Settings,
        client: RateLimitedInferenceClient,
        extractor: CallGraphExtractor,
        cache: ContentCache,
        summary_cache: ContentCache,
    ) -> Self {
        Self {
            root: root.into(),
            settings,
            client,
            extractor,
            cache: Mutex::new(cache),
            summary_cache: Mutex::new(summary_cache),
        }
    }

    /// Load both caches from their configured locations under `root`.
    pub fn load(
        root: &Path,
        settings: Settings,
        client: RateLimitedInferenceClient,
        extractor: CallGraphExtractor,
    ) -> Arc<Self> {
        let cache_path = settings.cache_path_for(root);
        let cache = ContentCache::load(&cache_path);
        let summary_cache = ContentCache::load(summary_cache_path(&cache_path));
        tracing::info!("Loaded {} cached analyses from {}", cache.len(), cache_path.display());

        Arc::new(Self::new(root, settings, client, extractor, cache, summary_cache))
    }
}
