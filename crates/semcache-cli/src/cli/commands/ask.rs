use super::{exit_codes, resolve_config};
use crate::cli::args::AskArgs;
use anyhow::Context;
use semcache_core::providers::build_providers;
use semcache_core::storage::Store;
use semcache_core::{CacheOrchestrator, CacheOutcome, CycleError, ProviderError};
use std::io::Write;
use tokio::io::AsyncBufReadExt;

pub async fn run(args: AskArgs) -> anyhow::Result<i32> {
    let mut cfg = resolve_config(&args.store)?;
    if let Some(t) = args.threshold {
        cfg.cache.threshold = t;
    }
    if let Some(p) = args.embedder {
        cfg.embedding.provider = p;
    }
    if let Some(p) = args.generator {
        cfg.generation.provider = p;
    }

    // Reject the config before a database file is created for it.
    let (embedder, llm) = build_providers(&cfg)?;
    let store = Store::open(&cfg.cache.db)
        .with_context(|| format!("failed to open cache db {}", cfg.cache.db.display()))?;
    store.init_schema()?;
    let orchestrator = CacheOrchestrator::with_providers(&cfg, embedder, llm, store)?;

    let (embedding_model, generation_model) = orchestrator.models();
    tracing::info!(
        db = %cfg.cache.db.display(),
        embedding_model,
        generation_model,
        threshold = orchestrator.policy().threshold,
        "ask"
    );

    let query = if args.query.is_empty() {
        read_query().await?
    } else {
        args.query.join(" ")
    };

    let json = args.format == "json";
    match orchestrator.answer(&query).await {
        Ok(outcome) => {
            if json {
                println!("{}", serde_json::to_string(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
            Ok(exit_codes::OK)
        }
        Err(e) => {
            if json {
                println!("{}", failure_json(&e));
            } else {
                eprintln!("error: {}", e);
            }
            Ok(exit_codes::CYCLE_FAILED)
        }
    }
}

async fn read_query() -> anyhow::Result<String> {
    eprint!("Ask your question: ");
    std::io::stderr().flush()?;
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    Ok(lines.next_line().await?.unwrap_or_default())
}

fn print_outcome(outcome: &CacheOutcome) {
    match outcome {
        CacheOutcome::Hit {
            record_id,
            distance,
            ..
        } => {
            eprintln!(
                "cache hit: record #{} (similarity distance {:.4})",
                record_id, distance
            );
        }
        CacheOutcome::Miss {
            record_id,
            latency_ms,
            ..
        } => {
            eprintln!(
                "cache miss: generated a fresh answer in {} ms (stored as record #{})",
                latency_ms, record_id
            );
        }
    }
    println!("{}", outcome.output());
}

fn failure_json(e: &CycleError) -> serde_json::Value {
    let provider_error: Option<&ProviderError> = match e {
        CycleError::EmbeddingFailed(p) | CycleError::GenerationFailed(p) => Some(p),
        _ => None,
    };
    serde_json::json!({
        "outcome": e.outcome(),
        "error": e.to_string(),
        "error_type": provider_error.map(|p| p.kind()),
    })
}
