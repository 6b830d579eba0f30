pub mod orchestrator;

pub use orchestrator::{CacheOrchestrator, CachePolicy};
