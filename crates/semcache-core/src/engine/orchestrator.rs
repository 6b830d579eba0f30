use crate::config::{validate_threshold, CacheConfig};
use crate::embeddings::{Embedder, EmbeddingClient};
use crate::errors::{ConfigError, CycleError};
use crate::model::{CacheOutcome, NewRecord};
use crate::providers::build_providers;
use crate::providers::llm::{LlmClient, ResponseGenerator};
use crate::storage::{SimilarityStore, Store};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    /// Hit when the nearest distance is strictly below this value.
    pub threshold: f64,
    /// Caller tag stored with new records.
    pub user_id: Option<String>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            threshold: crate::config::DEFAULT_THRESHOLD,
            user_id: None,
        }
    }
}

/// Cache-or-compute decision for one query at a time.
///
/// Holds no record state between calls; every `answer` is a fresh
/// embed/lookup/decide/write cycle against the store.
pub struct CacheOrchestrator {
    embedder: EmbeddingClient,
    generator: ResponseGenerator,
    store: Arc<dyn SimilarityStore>,
    policy: CachePolicy,
}

impl CacheOrchestrator {
    pub fn new(
        embedder: EmbeddingClient,
        generator: ResponseGenerator,
        store: Arc<dyn SimilarityStore>,
        policy: CachePolicy,
    ) -> Result<Self, ConfigError> {
        validate_threshold(policy.threshold)?;
        Ok(Self {
            embedder,
            generator,
            store,
            policy,
        })
    }

    /// Wires providers from `cfg` against `store`, which also serves as the
    /// error sink.
    pub fn from_config(cfg: &CacheConfig, store: Store) -> Result<Self, ConfigError> {
        let (embedder, llm) = build_providers(cfg)?;
        Self::with_providers(cfg, embedder, llm, store)
    }

    /// Like `from_config`, with providers already built by `build_providers`.
    pub fn with_providers(
        cfg: &CacheConfig,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmClient>,
        store: Store,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let store = Arc::new(store);
        let timeout = Duration::from_secs(cfg.timeout_seconds);

        let embedder = EmbeddingClient::new(embedder, store.clone()).with_timeout(timeout);
        let generator = ResponseGenerator::new(llm, store.clone()).with_timeout(timeout);

        Self::new(
            embedder,
            generator,
            store,
            CachePolicy {
                threshold: cfg.cache.threshold,
                user_id: cfg.user_id.clone(),
            },
        )
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// (embedding model, generation model)
    pub fn models(&self) -> (&str, &str) {
        (self.embedder.model_id(), self.generator.model_id())
    }

    pub async fn answer(&self, query: &str) -> Result<CacheOutcome, CycleError> {
        self.answer_with_threshold(query, self.policy.threshold).await
    }

    pub async fn answer_with_threshold(
        &self,
        query: &str,
        threshold: f64,
    ) -> Result<CacheOutcome, CycleError> {
        if validate_threshold(threshold).is_err() {
            return Err(CycleError::InvalidThreshold(threshold));
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(CycleError::EmptyQuery);
        }

        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(CycleError::EmbeddingFailed)?;
        tracing::debug!(
            event = "semcache.embed",
            model = %vector.model,
            dims = vector.dims()
        );

        let nearest = self.store.find_nearest(&vector).map_err(|e| {
            tracing::error!(event = "semcache.failure", phase = "lookup", error = %e);
            e
        })?;
        tracing::debug!(
            event = "semcache.lookup",
            found = nearest.is_some(),
            distance = nearest.as_ref().map(|m| m.distance),
            threshold
        );

        if let Some(m) = nearest {
            if m.distance < threshold {
                tracing::info!(
                    event = "semcache.hit",
                    record_id = m.record_id,
                    distance = m.distance,
                    threshold
                );
                return Ok(CacheOutcome::Hit {
                    record_id: m.record_id,
                    matched_input: m.input_text,
                    output: m.output_text,
                    distance: m.distance,
                });
            }
        }

        let generation = self
            .generator
            .generate(query)
            .await
            .map_err(CycleError::GenerationFailed)?;

        let record_id = self
            .store
            .append(&NewRecord {
                user_id: self.policy.user_id.as_deref(),
                input_text: query,
                model_name: &generation.model,
                output_text: &generation.text,
                embedding: &vector,
                latency_ms: generation.latency_ms,
            })
            .map_err(|e| {
                tracing::error!(event = "semcache.failure", phase = "append", error = %e);
                e
            })?;

        tracing::info!(
            event = "semcache.miss",
            record_id,
            model = %generation.model,
            latency_ms = generation.latency_ms
        );

        Ok(CacheOutcome::Miss {
            record_id,
            output: generation.text,
            latency_ms: generation.latency_ms,
        })
    }
}
