use super::args::*;
use semcache_core::config::{load_config, load_config_or_default, CacheConfig};
use std::path::Path;

pub mod ask;
pub mod stats;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const CYCLE_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub const DEFAULT_CONFIG: &str = "semcache.yaml";

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    tracing::debug!(command = cli.cmd.name(), "dispatch");
    match cli.cmd {
        Command::Ask(args) => ask::run(args).await,
        Command::Init(args) => cmd_init(args),
        Command::Stats(args) => stats::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Ask(_) => "ask",
            Command::Init(_) => "init",
            Command::Stats(_) => "stats",
            Command::Version => "version",
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        eprintln!("note: {} already exists", args.config.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = args.config.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    semcache_core::config::write_sample_config(&args.config)?;
    tracing::info!(config = %args.config.display(), "wrote sample config");
    eprintln!("created {}", args.config.display());
    Ok(exit_codes::OK)
}

/// Config file, then environment, then `--db`.
pub fn resolve_config(args: &StoreArgs) -> anyhow::Result<CacheConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path)?,
        None => load_config_or_default(Path::new(DEFAULT_CONFIG))?,
    };
    cfg.apply_process_env()?;
    if let Some(db) = &args.db {
        cfg.cache.db = db.clone();
    }
    Ok(cfg)
}
