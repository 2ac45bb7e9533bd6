//! Codescope core: graph data model, content cache, aggregation and settings

pub mod model;
pub mod graph;
pub mod cache;
pub mod aggregation;
pub mod config;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use model::{NodeKind, EdgeKind, GraphNode, CallEdge, ExtractionMode, SymbolFacts, AnalysisResult, file_type_label};
pub use graph::{CodeGraph, GraphSnapshot, LinkRecord};
pub use cache::{CACHE_DIR, CACHE_FILE, SUMMARY_CACHE_FILE, CacheEntry, CachedAnalysis, CacheError, ContentCache, cache_dir, clear_cache, content_hash, default_cache_path, summary_cache_path};
pub use aggregation::{AnalysisBundle, BundleError, GraphMetrics, RankedEntry, ResultAggregator};
pub use config::{ConfigError, Decoding, MAX_CONCURRENT_CALLS, MAX_WINDOW_SECS, Settings};
