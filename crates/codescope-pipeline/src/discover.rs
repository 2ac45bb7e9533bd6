//! Source file discovery

use crate::orchestrator::PipelineError;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// A file selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Root-relative, `/`-separated; used as the cache key and in the bundle.
    pub key: String,
}

/// Walk `root` and collect files whose extension is in `extensions`.
///
/// Ignore files (`.gitignore` inside a git work tree, `.ignore`, global
/// excludes) and hidden entries are skipped, which also keeps the
/// `.codescope` cache directory out of the scan. The result is sorted by key.
pub fn discover_files(root: &Path, extensions: &[String]) -> Result<Vec<DiscoveredFile>, PipelineError> {
    if !root.is_dir() {
        return Err(PipelineError::RootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let wanted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext));
        if !wanted {
            continue;
        }

        files.push(DiscoveredFile {
            key: relative_key(root, path),
            path: path.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.key.cmp(&b.key));
    tracing::debug!("Discovered {} files under {}", files.len(), root.display());
    Ok(files)
}

fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
