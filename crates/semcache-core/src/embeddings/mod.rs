use crate::errors::ProviderError;
use crate::model::Embedding;
use async_trait::async_trait;

pub mod client;
pub mod fake;
pub mod openai;
pub mod util;

pub use client::EmbeddingClient;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError>;
    fn model_id(&self) -> &str;
    fn provider_name(&self) -> &'static str;
}
