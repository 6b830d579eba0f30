use super::LlmClient;
use crate::errors::ProviderError;
use crate::model::LlmResponse;
use async_trait::async_trait;

/// Offline generator. Replies with a fixed text, or echoes the prompt.
pub struct FakeLlmClient {
    pub model: String,
    pub reply: Option<String>,
}

impl Default for FakeLlmClient {
    fn default() -> Self {
        Self {
            model: "fake-llm".to_string(),
            reply: None,
        }
    }
}

impl FakeLlmClient {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, ProviderError> {
        let text = match &self.reply {
            Some(r) => r.clone(),
            None => format!("echo: {}", prompt.trim()),
        };
        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
