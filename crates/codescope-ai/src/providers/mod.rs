//! Completion backend implementations

pub mod openrouter;

use crate::bridge::{CompletionBackend, InferenceError};
use codescope_core::config::InferenceSettings;
use std::sync::Arc;

/// Build the configured HTTP backend.
///
/// A missing credential is not an error here: cached runs never reach the
/// network, and uncached calls fail per chunk with the service's status.
pub fn create_backend(settings: &InferenceSettings) -> Result<Arc<dyn CompletionBackend>, InferenceError> {
    if settings.api_key.is_none() {
        tracing::warn!(
            "No API key configured ({} is not set); uncached files will record failed analyses",
            settings.api_key_env
        );
    }

    let backend = openrouter::OpenRouterBackend::from_settings(settings)?;
    tracing::debug!("Using {} backend at {}", backend.name(), backend.endpoint());
    Ok(Arc::new(backend))
}
