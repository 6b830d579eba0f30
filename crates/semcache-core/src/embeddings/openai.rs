use super::Embedder;
use crate::errors::ProviderError;
use crate::model::Embedding;
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIEmbedder {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl OpenAIEmbedder {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": [text],
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("openai", &e))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status("openai", status, &error_text));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::from_transport("openai", &e))?;

        let arr = json
            .pointer("/data/0/embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                ProviderError::service("openai", "embeddings response missing data[0].embedding")
            })?;

        let values = arr
            .iter()
            .map(|x| {
                x.as_f64().map(|f| f as f32).ok_or_else(|| {
                    ProviderError::service("openai", "embedding contains non-numeric value")
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;

        if values.is_empty() {
            return Err(ProviderError::service("openai", "embedding is empty"));
        }

        Ok(Embedding::new(self.model.clone(), values))
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
