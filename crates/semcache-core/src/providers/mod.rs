use crate::config::{CacheConfig, ProviderKind};
use crate::embeddings::fake::FakeEmbedder;
use crate::embeddings::openai::OpenAIEmbedder;
use crate::embeddings::Embedder;
use crate::errors::ConfigError;
use llm::fake::FakeLlmClient;
use llm::openai::OpenAIClient;
use llm::LlmClient;
use std::sync::Arc;

pub mod llm;

pub fn build_embedder(cfg: &CacheConfig) -> Result<Arc<dyn Embedder>, ConfigError> {
    match cfg.embedding.provider {
        ProviderKind::Fake => Ok(Arc::new(FakeEmbedder::default())),
        ProviderKind::Openai => {
            let mut e = OpenAIEmbedder::new(cfg.embedding.model.clone(), require_key(cfg)?);
            if let Some(url) = &cfg.embedding.base_url {
                e = e.with_base_url(url.clone());
            }
            Ok(Arc::new(e))
        }
    }
}

pub fn build_llm_client(cfg: &CacheConfig) -> Result<Arc<dyn LlmClient>, ConfigError> {
    match cfg.generation.provider {
        ProviderKind::Fake => Ok(Arc::new(FakeLlmClient::default())),
        ProviderKind::Openai => {
            let mut c = OpenAIClient::new(cfg.generation.model.clone(), require_key(cfg)?)
                .with_sampling(cfg.generation.temperature, cfg.generation.max_tokens);
            if let Some(url) = &cfg.generation.base_url {
                c = c.with_base_url(url.clone());
            }
            Ok(Arc::new(c))
        }
    }
}

/// Validates `cfg` and builds both providers. Touches no storage, so callers
/// can reject a bad config before creating a database file.
pub fn build_providers(
    cfg: &CacheConfig,
) -> Result<(Arc<dyn Embedder>, Arc<dyn LlmClient>), ConfigError> {
    cfg.validate()?;
    Ok((build_embedder(cfg)?, build_llm_client(cfg)?))
}

fn require_key(cfg: &CacheConfig) -> Result<String, ConfigError> {
    cfg.api_key
        .clone()
        .ok_or_else(|| ConfigError("OPENAI_API_KEY is not set (required for the openai provider)".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_key() {
        let cfg = CacheConfig::default();
        let err = build_embedder(&cfg).err().unwrap();
        assert!(err.0.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn fake_needs_no_key() {
        let mut cfg = CacheConfig::default();
        cfg.embedding.provider = ProviderKind::Fake;
        cfg.generation.provider = ProviderKind::Fake;
        assert_eq!(build_embedder(&cfg).unwrap().provider_name(), "fake");
        assert_eq!(build_llm_client(&cfg).unwrap().provider_name(), "fake");
    }

    #[test]
    fn build_providers_validates_first() {
        let mut cfg = CacheConfig::default();
        cfg.embedding.provider = ProviderKind::Fake;
        cfg.generation.provider = ProviderKind::Fake;
        cfg.cache.threshold = f64::NAN;
        let err = build_providers(&cfg).err().unwrap();
        assert!(err.0.contains("threshold"));

        cfg.cache.threshold = 0.2;
        let (e, l) = build_providers(&cfg).unwrap();
        assert_eq!(e.model_id(), "fake-embedding");
        assert_eq!(l.model_id(), "fake-llm");
    }

    #[test]
    fn openai_uses_configured_models() {
        let mut cfg = CacheConfig::default();
        cfg.api_key = Some("sk-test".into());
        assert_eq!(build_embedder(&cfg).unwrap().model_id(), "text-embedding-3-small");
        assert_eq!(build_llm_client(&cfg).unwrap().model_id(), "gpt-3.5-turbo");
    }
}
