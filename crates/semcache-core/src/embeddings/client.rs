use super::Embedder;
use crate::errors::ProviderError;
use crate::model::Embedding;
use crate::on_error::{report_provider_error, Phase};
use crate::storage::ErrorSink;
use std::sync::Arc;
use std::time::Duration;

/// Embedding boundary: never retries, reports every failure to the sink.
#[derive(Clone)]
pub struct EmbeddingClient {
    embedder: Arc<dyn Embedder>,
    errors: Arc<dyn ErrorSink>,
    timeout: Option<Duration>,
}

impl EmbeddingClient {
    pub fn new(embedder: Arc<dyn Embedder>, errors: Arc<dyn ErrorSink>) -> Self {
        Self {
            embedder,
            errors,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model_id(&self) -> &str {
        self.embedder.model_id()
    }

    pub async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        let provider = self.embedder.provider_name();
        let result = match self.timeout {
            Some(t) => match tokio::time::timeout(t, self.embedder.embed(text)).await {
                Ok(r) => r,
                Err(_) => Err(ProviderError::timed_out(
                    provider,
                    format!("no embedding within {}ms", t.as_millis()),
                )),
            },
            None => self.embedder.embed(text).await,
        }
        .and_then(|e| validate(provider, e));

        if let Err(e) = &result {
            report_provider_error(self.errors.as_ref(), Phase::Embedding, e);
        }
        result
    }
}

fn validate(provider: &str, e: Embedding) -> Result<Embedding, ProviderError> {
    if e.values.is_empty() {
        return Err(ProviderError::service(provider, "embedding is empty"));
    }
    if e.values.iter().any(|x| !x.is_finite()) {
        return Err(ProviderError::service(
            provider,
            "embedding contains non-finite values",
        ));
    }
    Ok(e)
}
