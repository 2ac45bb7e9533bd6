//! Textual digests of analysis batches for the second-tier summary

use codescope_core::AnalysisResult;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const PURPOSE_HEADING: &str = "## Overall Purpose";
const NOTABLE_NAMES: usize = 5;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));

/// Text of the first `## Overall Purpose` section, if the analysis has one.
pub fn purpose_of(analysis: &str) -> Option<&str> {
    let (_, rest) = analysis.split_once(PURPOSE_HEADING)?;
    let section = rest.split("##").next().unwrap_or(rest);
    Some(section.trim())
}

/// Bold `**name**` entries, in order of appearance.
pub fn notable_names(analysis: &str, limit: usize) -> Vec<&str> {
    BOLD.captures_iter(analysis)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .take(limit)
        .collect()
}

/// Number of results per file type, ordered by type label.
pub fn file_type_counts(results: &[AnalysisResult]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for result in results {
        *counts.entry(result.file_type.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Digest for one batch: counts by type, then each file's purpose and
/// notable function names.
pub fn batch_digest(batch: &[AnalysisResult]) -> String {
    let mut digest = String::from("Codebase Chunk Analysis:\n\n");
    digest.push_str(&format!("This chunk contains {} files:\n", batch.len()));
    for (file_type, count) in file_type_counts(batch) {
        digest.push_str(&format!("- {} {} files\n", count, file_type));
    }

    digest.push_str("\nFile Details:\n");
    for result in batch {
        let purpose = purpose_of(&result.analysis).unwrap_or("Purpose not found in analysis");
        digest.push_str(&format!("- {}:\n  Purpose: {}\n", result.file_path, purpose));

        let names = notable_names(&result.analysis, NOTABLE_NAMES);
        if names.is_empty() {
            digest.push_str("  Main Functions: None found in analysis\n");
        } else {
            digest.push_str(&format!("  Main Functions: {}\n", names.join(", ")));
        }
    }

    digest
}
