pub mod config;
pub mod embeddings;
pub mod engine;
pub mod errors;
pub mod model;
pub mod on_error;
pub mod providers;
pub mod storage;

pub use engine::{CacheOrchestrator, CachePolicy};
pub use errors::{ConfigError, CycleError, ProviderError, StoreError};
pub use model::CacheOutcome;
