use clap::{Parser, Subcommand};
use semcache_core::config::ProviderKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "semcache",
    version,
    about = "Semantic response cache for LLM queries"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,

    /// emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer one query, from cache when a close enough one was seen before
    Ask(AskArgs),
    /// Write a sample config file
    Init(InitArgs),
    /// Show cache counters and recent provider errors
    Stats(StatsArgs),
    Version,
}

/// Options shared by every command that opens the store.
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// config file (defaults to ./semcache.yaml when present)
    #[arg(long, env = "SEMCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// sqlite database path (overrides config and SEMCACHE_DB)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AskArgs {
    /// the question; read from stdin when omitted
    pub query: Vec<String>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// distance below which a stored answer is reused
    #[arg(long)]
    pub threshold: Option<f64>,

    /// embedder provider (openai|fake)
    #[arg(long)]
    pub embedder: Option<ProviderKind>,

    /// generator provider (openai|fake)
    #[arg(long)]
    pub generator: Option<ProviderKind>,

    /// output format: text|json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, env = "SEMCACHE_CONFIG", default_value = "semcache.yaml")]
    pub config: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// number of recent errors to list
    #[arg(long, default_value_t = 5)]
    pub errors: u32,

    /// output format: text|json
    #[arg(long, default_value = "text")]
    pub format: String,
}
