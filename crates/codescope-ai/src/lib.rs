//! Inference bridge for Codescope
//!
//! Sends file chunks and batch digests to a chat-completions endpoint under a
//! process-wide concurrency cap and rolling rate window. Call failures are
//! folded into the returned text as per-chunk notes instead of errors.

pub mod admission;
pub mod bridge;
pub mod chunking;
pub mod client;
pub mod prompt;
pub mod providers;


pub use admission::{Admission, AdmissionGates, RateWindow};
pub use bridge::{ChatMessage, CompletionBackend, CompletionRequest, InferenceError};
pub use chunking::split_content;
pub use client::{RateLimitedInferenceClient, SummaryOutcome};
pub use providers::{create_backend, openrouter::OpenRouterBackend};
