use crate::errors::ProviderError;
use crate::model::LlmResponse;
use async_trait::async_trait;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, ProviderError>;
    fn provider_name(&self) -> &'static str;
    fn model_id(&self) -> &str;
}

pub mod fake;
pub mod generator;
pub mod openai;

pub use generator::ResponseGenerator;
