//! Drives every discovered file to a terminal state, then runs the
//! second-tier passes and assembles the bundle.
//!
//! Per file: read and hash, extract call facts, then either serve the cached
//! analysis (stored hash matches) or analyze it chunk by chunk and write the
//! result back. A file that cannot be decoded ends as `Unreadable` and is left
//! out of the results and graphs; nothing else is affected.

use crate::context::RunContext;
use crate::digest::{batch_digest, file_type_counts};
use crate::discover::{discover_files, DiscoveredFile};
use crate::reader::{read_source, ReadError};
use codescope_ai::SummaryOutcome;
use codescope_core::{
    content_hash, file_type_label, AnalysisBundle, AnalysisResult, ResultAggregator, SymbolFacts,
};
use futures_util::future::join_all;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Symbols reported by the call-graph analysis pass.
const MOST_CALLED_IN_SUMMARY: usize = 5;

const CALL_GRAPH_KEY: &str = "call-graph";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("root directory not found: {0}")]
    RootNotFound(PathBuf),
}

/// Terminal state of one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Stored hash matched; no call was made.
    Cached {
        result: AnalysisResult,
        facts: SymbolFacts,
    },
    /// Analyzed in this run. `cache_written` is false when a chunk failed or
    /// the cache could not be persisted.
    Analyzed {
        result: AnalysisResult,
        facts: SymbolFacts,
        cache_written: bool,
    },
    Unreadable {
        key: String,
        error: ReadError,
    },
}

impl FileOutcome {
    pub fn key(&self) -> &str {
        match self {
            FileOutcome::Cached { result, .. } | FileOutcome::Analyzed { result, .. } => &result.file_path,
            FileOutcome::Unreadable { key, .. } => key,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_discovered: usize,
    pub cache_hits: usize,
    pub analyzed: usize,
    /// Analyzed files with at least one failed chunk
    pub incomplete: usize,
    pub unreadable: usize,
    /// Second-tier results served from the summary cache
    pub summary_hits: usize,
    /// Complete analyses that could not be written to the cache
    pub cache_write_failures: usize,
    /// Inference calls admitted during the run
    pub calls_issued: usize,
}

#[derive(Debug)]
pub struct RunReport {
    pub bundle: AnalysisBundle,
    pub summary: RunSummary,
}

pub struct AnalysisOrchestrator {
    ctx: Arc<RunContext>,
}

impl AnalysisOrchestrator {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Analyze the whole tree and build the bundle.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let calls_before = self.ctx.client.calls_issued();
        let files = discover_files(&self.ctx.root, &self.ctx.settings.scan.extensions)?;
        tracing::info!("Analyzing {} files under {}", files.len(), self.ctx.root.display());

        let mut summary = RunSummary {
            files_discovered: files.len(),
            ..RunSummary::default()
        };

        let mut tasks = JoinSet::new();
        for file in files {
            let ctx = self.ctx.clone();
            tasks.spawn(async move { process_file(ctx, file).await });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!("File task failed: {}", e),
            }
        }
        outcomes.sort_by(|a, b| a.key().cmp(b.key()));

        let mut aggregator = ResultAggregator::new();
        let mut results = Vec::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Cached { result, facts } => {
                    summary.cache_hits += 1;
                    aggregator.add_file(&result.file_path, &facts);
                    results.push(result);
                }
                FileOutcome::Analyzed {
                    result,
                    facts,
                    cache_written,
                } => {
                    summary.analyzed += 1;
                    if !result.is_complete() {
                        summary.incomplete += 1;
                    } else if !cache_written {
                        summary.cache_write_failures += 1;
                    }
                    aggregator.add_file(&result.file_path, &facts);
                    results.push(result);
                }
                FileOutcome::Unreadable { .. } => summary.unreadable += 1,
            }
        }

        let global_analysis = self.global_analysis(&results, &mut summary).await;
        let call_graph_analysis = self.call_graph_analysis(&aggregator, &mut summary).await;

        summary.calls_issued = self.ctx.client.calls_issued() - calls_before;
        tracing::info!(
            "Run complete: {} cached, {} analyzed ({} incomplete), {} unreadable, {} calls",
            summary.cache_hits,
            summary.analyzed,
            summary.incomplete,
            summary.unreadable,
            summary.calls_issued
        );

        let bundle = aggregator.into_bundle(
            global_analysis,
            call_graph_analysis,
            results,
            self.ctx.settings.summary.top_entries,
        );
        Ok(RunReport { bundle, summary })
    }

    /// Summarize results in fixed-size batches and join the narratives,
    /// tagged by batch index, with a per-type footer.
    async fn global_analysis(&self, results: &[AnalysisResult], summary: &mut RunSummary) -> String {
        let batches: Vec<&[AnalysisResult]> = results.chunks(self.ctx.settings.summary.batch_size).collect();
        let total = batches.len();

        let narratives = join_all(batches.iter().enumerate().map(|(i, batch)| {
            let index = i + 1;
            let digest = batch_digest(batch);
            async move {
                let key = format!("batch-{}", index);
                let client = &self.ctx.client;
                self.summarize(&key, &digest, || client.analyze_batch_summary(index, total, &digest))
                    .await
            }
        }))
        .await;

        let mut text = String::from("# Global Codebase Analysis\n\n");
        for (i, (narrative, from_cache)) in narratives.into_iter().enumerate() {
            if from_cache {
                summary.summary_hits += 1;
            }
            text.push_str(&format!("## Chunk {} Analysis\n\n{}\n\n", i + 1, narrative));
        }

        text.push_str("\n# Overall Summary\n\n");
        text.push_str(&format!("Total Files Analyzed: {}\n", results.len()));
        for (file_type, count) in file_type_counts(results) {
            text.push_str(&format!("- {} {} files\n", count, file_type));
        }
        text
    }

    async fn call_graph_analysis(&self, aggregator: &ResultAggregator, summary: &mut RunSummary) -> String {
        let graph_summary = aggregator.call_graph_summary(MOST_CALLED_IN_SUMMARY);
        let client = &self.ctx.client;
        let (text, from_cache) = self
            .summarize(CALL_GRAPH_KEY, &graph_summary, || client.analyze_call_graph(&graph_summary))
            .await;
        if from_cache {
            summary.summary_hits += 1;
        }
        text
    }

    /// Serve a second-tier result from the summary cache when its input text
    /// is unchanged, otherwise make the call and cache a successful answer.
    async fn summarize<F, Fut>(&self, key: &str, input: &str, call: F) -> (String, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SummaryOutcome>,
    {
        let hash = content_hash(input);
        if let Some(hit) = self.ctx.summary_cache.lock().await.get(key, &hash) {
            tracing::info!("Using cached summary for {}", key);
            return (hit.analysis, true);
        }

        let outcome = call().await;
        if !outcome.failed {
            let result = AnalysisResult::new(key, "Summary", outcome.text.clone());
            if let Err(e) = self.ctx.summary_cache.lock().await.put(key, &hash, &result) {
                tracing::error!("Failed to persist summary cache: {}", e);
            }
        }
        (outcome.text, false)
    }
}

/// Take one file from discovery to a terminal state.
async fn process_file(ctx: Arc<RunContext>, file: DiscoveredFile) -> FileOutcome {
    let source = match read_source(&file, &ctx.settings.scan.decodings).await {
        Ok(source) => source,
        Err(error) => {
            tracing::warn!("Skipping unreadable file {}: {}", file.key, error);
            return FileOutcome::Unreadable { key: file.key, error };
        }
    };

    // extraction does not depend on cache state
    let facts = ctx.extractor.extract(&source.path, &source.text).await;

    let cached = ctx.cache.lock().await.get(&source.key, &source.hash);
    if let Some(result) = cached {
        tracing::info!("Using cached analysis for {}", source.key);
        return FileOutcome::Cached { result, facts };
    }

    tracing::info!("Analyzing {}", source.key);
    let file_type = file_type_label(&source.path);
    let result = ctx.client.analyze(&source.key, &source.text, file_type).await;

    let cache_written = if result.is_complete() {
        match ctx.cache.lock().await.put(&source.key, &source.hash, &result) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to persist cache after {}: {}", source.key, e);
                false
            }
        }
    } else {
        tracing::warn!(
            "Not caching {}: {} chunk(s) failed and will be retried next run",
            source.key,
            result.failed_chunks
        );
        false
    };

    FileOutcome::Analyzed {
        result,
        facts,
        cache_written,
    }
}
