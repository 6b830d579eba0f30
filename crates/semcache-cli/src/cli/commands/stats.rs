use super::{exit_codes, resolve_config};
use crate::cli::args::StatsArgs;
use anyhow::Context;
use semcache_core::storage::Store;

pub fn run(args: StatsArgs) -> anyhow::Result<i32> {
    let cfg = resolve_config(&args.store)?;
    let store = Store::open(&cfg.cache.db)
        .with_context(|| format!("failed to open cache db {}", cfg.cache.db.display()))?;
    store.init_schema()?;

    let stats = store.stats()?;
    let errors = store.recent_errors(args.errors)?;

    if args.format == "json" {
        let out = serde_json::json!({
            "db": cfg.cache.db,
            "threshold": cfg.cache.threshold,
            "stats": stats,
            "recent_errors": errors,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(exit_codes::OK);
    }

    println!("db:          {}", cfg.cache.db.display());
    println!("threshold:   {}", cfg.cache.threshold);
    println!("records:     {}", stats.records);
    println!("embeddings:  {}", stats.embeddings);
    println!("errors:      {}", stats.errors);
    println!(
        "last record: {}",
        stats.last_record_at.as_deref().unwrap_or("-")
    );
    if !errors.is_empty() {
        println!("\nrecent errors:");
        for e in &errors {
            println!("  [{}] {} {}: {}", e.id, e.created_at, e.error_type, e.error_message);
        }
    }
    Ok(exit_codes::OK)
}
