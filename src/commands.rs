//! CLI command implementations

use anyhow::Context;
use codescope_ai::{create_backend, RateLimitedInferenceClient};
use codescope_core::Settings;
use codescope_indexer::CallGraphExtractor;
use codescope_pipeline::{AnalysisOrchestrator, RunContext};
use std::path::PathBuf;

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub cache: Option<PathBuf>,
    pub max_concurrency: Option<usize>,
    pub calls_per_window: Option<usize>,
    pub window_secs: Option<u64>,
    pub model: Option<String>,
}

/// Settings file, then environment, then command line.
fn load_settings(config: Option<PathBuf>, overrides: Overrides) -> anyhow::Result<Settings> {
    let mut settings = Settings::load_or_default(config.as_deref()).context("failed to load settings")?;
    settings.apply_env().context("invalid environment override")?;

    if let Some(cache) = overrides.cache {
        settings.cache_path = Some(cache);
    }
    if let Some(k) = overrides.max_concurrency {
        settings.limits.max_concurrent_calls = k;
    }
    if let Some(r) = overrides.calls_per_window {
        settings.limits.calls_per_window = r;
    }
    if let Some(w) = overrides.window_secs {
        settings.limits.window_secs = w;
    }
    if let Some(model) = overrides.model {
        settings.inference.model = model;
    }

    settings.validate().context("invalid settings")?;
    Ok(settings)
}

pub async fn analyze(
    root: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    overrides: Overrides,
) -> anyhow::Result<()> {
    let settings = load_settings(config, overrides)?;
    tracing::info!("Codescope v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Analyzing {} with {} (max {} concurrent, {} calls per {}s)",
        root.display(),
        settings.inference.model,
        settings.limits.max_concurrent_calls,
        settings.limits.calls_per_window,
        settings.limits.window_secs
    );

    let backend = create_backend(&settings.inference).context("failed to create inference backend")?;
    let client = RateLimitedInferenceClient::from_settings(backend, &settings);
    let ctx = RunContext::load(&root, settings, client, CallGraphExtractor::default());

    let report = AnalysisOrchestrator::new(ctx)
        .run()
        .await
        .with_context(|| format!("failed to analyze {}", root.display()))?;

    report
        .bundle
        .write_to(&output)
        .with_context(|| format!("failed to write results to {}", output.display()))?;

    let summary = &report.summary;
    println!("Analysis results saved to {}", output.display());
    println!(
        "{} files: {} from cache, {} analyzed ({} incomplete), {} unreadable; {} inference calls",
        summary.files_discovered,
        summary.cache_hits,
        summary.analyzed,
        summary.incomplete,
        summary.unreadable,
        summary.calls_issued
    );
    if summary.cache_write_failures > 0 {
        eprintln!(
            "warning: {} analyses could not be cached and will be repeated next run",
            summary.cache_write_failures
        );
    }
    Ok(())
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Clearing cache for: {}", root.display());

    codescope_core::clear_cache(&root)
        .with_context(|| format!("failed to clear cache under {}", root.display()))?;

    tracing::info!("Cache cleared");
    Ok(())
}
