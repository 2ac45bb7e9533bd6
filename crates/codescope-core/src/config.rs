//! Process-wide settings, read once at startup

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for `max_concurrent_calls`.
pub const MAX_CONCURRENT_CALLS: usize = 1024;

/// Upper bound for `window_secs` (one day).
pub const MAX_WINDOW_SECS: u64 = 86_400;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid environment override {name}={value}")]
    Env { name: String, value: String },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Text decodings a file may be read with, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoding {
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "ascii")]
    Ascii,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub inference: InferenceSettings,
    pub limits: LimitSettings,
    pub scan: ScanSettings,
    pub summary: SummarySettings,
    /// Cache file; defaults to `<root>/.codescope/analysis_cache.json`.
    pub cache_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// Chat-completions endpoint
    pub endpoint: String,
    /// Model name sent with every request
    pub model: String,
    /// API credential; usually supplied through `api_key_env`
    pub api_key: Option<String>,
    /// Environment variable holding the credential
    pub api_key_env: String,
    /// Character budget per chunk
    pub max_chunk_chars: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// K: simultaneous in-flight calls
    pub max_concurrent_calls: usize,
    /// R: calls admitted per window
    pub calls_per_window: usize,
    /// W: rolling window length in seconds
    pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// File extensions to analyze, without the dot
    pub extensions: Vec<String>,
    pub decodings: Vec<Decoding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Files per second-tier summary request
    pub batch_size: usize,
    /// Entries kept in ranked metrics
    pub top_entries: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "mistralai/mistral-nemo".to_string(),
            api_key: None,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            max_chunk_chars: 70_000,
            timeout_secs: 300,
        }
    }
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 5,
            calls_per_window: 5,
            window_secs: 60,
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            extensions: ["py", "js", "cpp", "h", "hpp", "java", "cs"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            decodings: vec![Decoding::Utf8, Decoding::Latin1],
        }
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            top_entries: 10,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inference: InferenceSettings::default(),
            limits: LimitSettings::default(),
            scan: ScanSettings::default(),
            summary: SummarySettings::default(),
            cache_path: None,
        }
    }
}

impl LimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Settings {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration with fallback to default
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                for candidate in ["codescope.toml", ".codescope.toml"] {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }
                Ok(Self::default())
            }
        }
    }

    /// Apply `CODESCOPE_*` overrides and resolve the credential from the
    /// environment when the file does not carry one.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if self.inference.api_key.is_none() {
            self.inference.api_key = std::env::var(&self.inference.api_key_env)
                .ok()
                .filter(|k| !k.is_empty());
        }
        if let Ok(model) = std::env::var("CODESCOPE_MODEL") {
            self.inference.model = model;
        }
        if let Some(v) = env_number("CODESCOPE_MAX_CONCURRENCY")? {
            self.limits.max_concurrent_calls = v as usize;
        }
        if let Some(v) = env_number("CODESCOPE_CALLS_PER_WINDOW")? {
            self.limits.calls_per_window = v as usize;
        }
        if let Some(v) = env_number("CODESCOPE_WINDOW_SECS")? {
            self.limits.window_secs = v;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_concurrent_calls == 0 {
            return Err(ConfigError::Invalid("max_concurrent_calls must be at least 1".into()));
        }
        if self.limits.max_concurrent_calls > MAX_CONCURRENT_CALLS {
            return Err(ConfigError::Invalid(format!(
                "max_concurrent_calls must be at most {}",
                MAX_CONCURRENT_CALLS
            )));
        }
        if self.limits.calls_per_window == 0 {
            return Err(ConfigError::Invalid("calls_per_window must be at least 1".into()));
        }
        if self.limits.window_secs == 0 {
            return Err(ConfigError::Invalid("window_secs must be at least 1".into()));
        }
        if self.limits.window_secs > MAX_WINDOW_SECS {
            return Err(ConfigError::Invalid(format!("window_secs must be at most {}", MAX_WINDOW_SECS)));
        }
        if self.inference.max_chunk_chars == 0 {
            return Err(ConfigError::Invalid("max_chunk_chars must be at least 1".into()));
        }
        if self.summary.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.scan.decodings.is_empty() {
            return Err(ConfigError::Invalid("at least one decoding must be permitted".into()));
        }
        Ok(())
    }

    /// Cache file for a scanned root.
    pub fn cache_path_for(&self, root: &Path) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| crate::cache::default_cache_path(root))
    }
}

fn env_number(name: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Env {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
