use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_THRESHOLD: f64 = 0.1;
pub const DEFAULT_DB_PATH: &str = ".semcache/cache.db";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Openai,
    Fake,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::Openai),
            "fake" => Ok(ProviderKind::Fake),
            other => Err(ConfigError(format!(
                "unknown provider '{}' (expected openai|fake)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_embedding_model(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_generation_model(),
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSettings {
    /// Distances strictly below this are hits.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_db")]
    pub db: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            db: default_db(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_version", alias = "configVersion")]
    pub version: u32,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            embedding: EmbeddingSettings::default(),
            generation: GenerationSettings::default(),
            cache: CacheSettings::default(),
            timeout_seconds: default_timeout_seconds(),
            user_id: None,
            api_key: None,
        }
    }
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_db() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}
fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}
fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}
fn default_timeout_seconds() -> u64 {
    30
}

impl CacheConfig {
    /// Applies `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `SEMCACHE_DB` and
    /// `SEMCACHE_THRESHOLD` from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.embedding.base_url.get_or_insert_with(|| v.clone());
            self.generation.base_url.get_or_insert(v);
        }
        if let Some(v) = lookup("SEMCACHE_DB").filter(|v| !v.trim().is_empty()) {
            self.cache.db = PathBuf::from(v);
        }
        if let Some(v) = lookup("SEMCACHE_THRESHOLD") {
            self.cache.threshold = v.trim().parse().map_err(|e| {
                ConfigError(format!("SEMCACHE_THRESHOLD '{}' is not a number: {}", v, e))
            })?;
        }
        Ok(())
    }

    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|k| std::env::var(k).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        validate_threshold(self.cache.threshold)?;
        if self.embedding.model.trim().is_empty() {
            return Err(ConfigError("embedding.model must not be empty".into()));
        }
        if self.generation.model.trim().is_empty() {
            return Err(ConfigError("generation.model must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError("timeout_seconds must be at least 1".into()));
        }
        Ok(())
    }
}

pub fn validate_threshold(threshold: f64) -> Result<(), ConfigError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ConfigError(format!(
            "threshold must be a finite, non-negative distance (got {})",
            threshold
        )));
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<CacheConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, path)
}

/// Loads `path` if it exists, otherwise falls back to defaults. Used for the
/// implicit default config location.
pub fn load_config_or_default(path: &Path) -> Result<CacheConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(config = %path.display(), "no config file, using defaults");
        Ok(CacheConfig::default())
    }
}

fn parse_config(raw: &str, path: &Path) -> Result<CacheConfig, ConfigError> {
    // An empty file is a valid "all defaults" config.
    if raw.trim().is_empty() {
        return Ok(CacheConfig::default());
    }

    let mut ignored = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);
    let cfg: CacheConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored.push(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML {}: {}", path.display(), e)))?;

    if !ignored.is_empty() {
        tracing::warn!(
            config = %path.display(),
            keys = ?ignored,
            "ignored unknown config fields"
        );
    }

    cfg.validate()?;
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError(format!(
            "refusing to overwrite existing config {}",
            path.display()
        )));
    }
    std::fs::write(
        path,
        r#"version: 1
embedding:
  provider: openai
  model: text-embedding-3-small
generation:
  provider: openai
  model: gpt-3.5-turbo
cache:
  # Euclidean distance; lookups strictly below this are served from cache.
  threshold: 0.1
  db: .semcache/cache.db
timeout_seconds: 30
user_id: cli_user
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
