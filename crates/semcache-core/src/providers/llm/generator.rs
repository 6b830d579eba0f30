use super::LlmClient;
use crate::errors::ProviderError;
use crate::model::Generation;
use crate::on_error::{report_provider_error, Phase};
use crate::storage::ErrorSink;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Generation boundary. Measures latency; persistence is left to the caller.
#[derive(Clone)]
pub struct ResponseGenerator {
    client: Arc<dyn LlmClient>,
    errors: Arc<dyn ErrorSink>,
    timeout: Option<Duration>,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn LlmClient>, errors: Arc<dyn ErrorSink>) -> Self {
        Self {
            client,
            errors,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model_id(&self) -> &str {
        self.client.model_id()
    }

    pub async fn generate(&self, prompt: &str) -> Result<Generation, ProviderError> {
        let provider = self.client.provider_name();
        let started = Instant::now();
        let result = match self.timeout {
            Some(t) => match tokio::time::timeout(t, self.client.complete(prompt)).await {
                Ok(r) => r,
                Err(_) => Err(ProviderError::timed_out(
                    provider,
                    format!("no completion within {}ms", t.as_millis()),
                )),
            },
            None => self.client.complete(prompt).await,
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let result = result.and_then(|resp| {
            // An empty completion is not worth caching.
            if resp.text.trim().is_empty() {
                return Err(ProviderError::service(provider, "empty completion"));
            }
            tracing::debug!(
                event = "semcache.generate",
                provider = %resp.provider,
                model = %resp.model,
                latency_ms
            );
            Ok(Generation {
                text: resp.text,
                model: resp.model,
                latency_ms,
            })
        });

        if let Err(e) = &result {
            report_provider_error(self.errors.as_ref(), Phase::Generation, e);
        }
        result
    }
}
