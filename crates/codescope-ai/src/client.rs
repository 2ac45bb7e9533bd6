//! Gated, chunked inference client

use crate::admission::AdmissionGates;
use crate::bridge::{ChatMessage, CompletionBackend, CompletionRequest, InferenceError};
use crate::chunking::split_content;
use crate::prompt;
use codescope_core::{AnalysisResult, Settings};
use std::sync::Arc;

/// Text produced by a single-call analysis, plus whether the call failed and
/// the text is a failure note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub text: String,
    pub failed: bool,
}

/// Issues analysis calls through the shared admission gates.
///
/// Cloning is cheap and every clone shares the same gates and backend.
#[derive(Clone)]
pub struct RateLimitedInferenceClient {
    backend: Arc<dyn CompletionBackend>,
    gates: Arc<AdmissionGates>,
    model: String,
    max_chunk_chars: usize,
}

impl RateLimitedInferenceClient {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        gates: Arc<AdmissionGates>,
        model: impl Into<String>,
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            backend,
            gates,
            model: model.into(),
            max_chunk_chars: max_chunk_chars.max(1),
        }
    }

    pub fn from_settings(backend: Arc<dyn CompletionBackend>, settings: &Settings) -> Self {
        Self::new(
            backend,
            Arc::new(AdmissionGates::from_limits(&settings.limits)),
            settings.inference.model.clone(),
            settings.inference.max_chunk_chars,
        )
    }

    pub fn gates(&self) -> &AdmissionGates {
        &self.gates
    }

    /// Calls admitted through the gates so far.
    pub fn calls_issued(&self) -> usize {
        self.gates.admitted()
    }

    async fn call(&self, messages: Vec<ChatMessage>) -> Result<String, InferenceError> {
        let _admission = self.gates.admit().await?;
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
        };
        self.backend.complete(&request).await
    }

    /// Analyze one file, chunk by chunk in order.
    ///
    /// Each chunk waits for the previous one's outcome before it is sent. A
    /// failed chunk is replaced by a note naming the chunk and the cause and
    /// counted in `failed_chunks`; later chunks still run.
    pub async fn analyze(&self, file_path: &str, content: &str, file_type: &str) -> AnalysisResult {
        let chunks = split_content(content, self.max_chunk_chars);
        let total = chunks.len();
        let mut failed_chunks = 0;
        let mut combined = format!("# Combined File Analysis for {} File\n\n", file_type);

        for (i, chunk) in chunks.iter().enumerate() {
            let index = i + 1;
            let messages = prompt::file_chunk_messages(file_path, file_type, chunk, index, total);
            let section = match self.call(messages).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Analysis failed for {} (chunk {}/{}): {}", file_path, index, total, e);
                    failed_chunks += 1;
                    format!("Analysis failed for chunk {} of {}: {}", index, file_path, e)
                }
            };
            combined.push_str(&format!("## Chunk {} Analysis\n\n{}\n\n", index, section));
        }

        tracing::debug!("Analyzed {} in {} chunk(s), {} failed", file_path, total, failed_chunks);

        AnalysisResult {
            file_path: file_path.to_string(),
            file_type: file_type.to_string(),
            analysis: combined,
            failed_chunks,
        }
    }

    /// Narrative summary of batch `index` (1-based) of `total`.
    pub async fn analyze_batch_summary(&self, index: usize, total: usize, digest: &str) -> SummaryOutcome {
        match self.call(prompt::batch_summary_messages(digest)).await {
            Ok(text) => SummaryOutcome { text, failed: false },
            Err(e) => {
                tracing::warn!("Global analysis failed for batch {}/{}: {}", index, total, e);
                SummaryOutcome {
                    text: format!("Analysis failed for batch {}: {}", index, e),
                    failed: true,
                }
            }
        }
    }

    /// Insights on the combined call graph from its textual summary.
    pub async fn analyze_call_graph(&self, summary: &str) -> SummaryOutcome {
        match self.call(prompt::call_graph_messages(summary)).await {
            Ok(text) => SummaryOutcome { text, failed: false },
            Err(e) => {
                tracing::warn!("Call graph analysis failed: {}", e);
                SummaryOutcome {
                    text: format!("Call graph analysis failed: {}", e),
                    failed: true,
                }
            }
        }
    }
}
