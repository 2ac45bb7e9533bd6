//! Disk-backed analysis cache keyed by file path and content hash

use crate::model::AnalysisResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Cache directory: .codescope/
pub const CACHE_DIR: &str = ".codescope";

/// Analysis cache file
pub const CACHE_FILE: &str = "analysis_cache.json";

/// Second-tier summaries, kept next to the analysis cache
pub const SUMMARY_CACHE_FILE: &str = "summary_cache.json";

/// Get cache directory path
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

/// Get the default cache file path for a scanned root
pub fn default_cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join(CACHE_FILE)
}

/// Summary cache that belongs to an analysis cache file
pub fn summary_cache_path(cache_path: &Path) -> PathBuf {
    cache_path.with_file_name(SUMMARY_CACHE_FILE)
}

/// Clear cache directory
pub fn clear_cache(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    Ok(())
}

/// SHA-256 hex digest of a file's full text.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to write cache {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Analysis payload stored with each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub file_type: String,
    pub analysis: String,
}

/// One persisted entry. Valid only while `hash` matches the current content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub analysis: CachedAnalysis,
}

/// Persistent mapping from file path to (content hash, prior analysis).
///
/// Every `put` rewrites the whole file through a temporary sibling and a
/// rename, so an interrupted run loses at most the update in flight.
#[derive(Debug)]
pub struct ContentCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl ContentCache {
    /// Empty cache that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the cache from disk.
    ///
    /// A missing file is an empty cache. A corrupted document or any entry
    /// missing required fields is dropped with a warning, never fatal.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut cache = Self::new(path);

        let raw = match std::fs::read_to_string(&cache.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return cache,
            Err(e) => {
                tracing::warn!("Cannot read cache {}: {}. It will be regenerated.", cache.path.display(), e);
                return cache;
            }
        };

        let document: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Cache file {} is corrupted ({}). It will be regenerated.", cache.path.display(), e);
                return cache;
            }
        };

        for (key, value) in document {
            match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => {
                    cache.entries.insert(key, entry);
                }
                Err(e) => {
                    tracing::warn!("Invalid cache entry for {} ({}). It will be regenerated.", key, e);
                }
            }
        }

        tracing::debug!("Loaded {} cache entries from {}", cache.entries.len(), cache.path.display());
        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &BTreeMap<String, CacheEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached analysis for `key`, only if the stored hash equals `current_hash`.
    pub fn get(&self, key: &str, current_hash: &str) -> Option<AnalysisResult> {
        let entry = self.entries.get(key)?;
        if entry.hash != current_hash {
            return None;
        }
        Some(AnalysisResult::new(
            key,
            entry.analysis.file_type.clone(),
            entry.analysis.analysis.clone(),
        ))
    }

    /// Insert or overwrite an entry and persist the whole cache.
    ///
    /// The in-memory entry is kept even if persisting fails.
    pub fn put(&mut self, key: &str, hash: &str, result: &AnalysisResult) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                hash: hash.to_string(),
                analysis: CachedAnalysis {
                    file_type: result.file_type.clone(),
                    analysis: result.analysis.clone(),
                },
            },
        );
        self.persist()
    }

    /// Write the full cache to disk.
    pub fn persist(&self) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        tracing::trace!("Cache persisted: {}", self.path.display());
        Ok(())
    }
}
