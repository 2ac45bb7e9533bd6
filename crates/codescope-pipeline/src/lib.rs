//! Per-file analysis pipeline for Codescope
//!
//! Discovers source files under a root, reads and hashes them, extracts call
//! facts, serves unchanged files from the content cache and routes the rest
//! through the gated inference client. A second tier summarizes the results
//! in fixed-size batches before everything is aggregated into one bundle.

pub mod context;
pub mod digest;
pub mod discover;
pub mod orchestrator;
pub mod reader;


pub use context::RunContext;
pub use digest::{batch_digest, purpose_of};
pub use discover::{discover_files, DiscoveredFile};
pub use orchestrator::{AnalysisOrchestrator, FileOutcome, PipelineError, RunReport, RunSummary};
pub use reader::{decode, read_source, ReadError, SourceFile};
