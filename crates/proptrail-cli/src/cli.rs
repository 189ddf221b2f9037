use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "proptrail",
    about = "proptrail — timestamped entity properties on a sorted key-value ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file (defaults to ./proptrail.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store file, overriding the configuration
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Key namespace, overriding the configuration
    #[arg(long, global = true)]
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty store file
    Init(InitArgs),
    /// Create or overwrite one property of an entity
    Write(WriteArgs),
    /// Show the current value of every property of an entity
    Query(QueryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Also write the demo products (product1 color=red, product2 size=large)
    #[arg(long)]
    pub seed: bool,
}

#[derive(Args)]
pub struct WriteArgs {
    pub entity: String,
    pub property: String,
    pub value: String,
    /// Epoch milliseconds; defaults to now
    #[arg(short, long, allow_negative_numbers = true)]
    pub timestamp: Option<i64>,
}

#[derive(Args)]
pub struct QueryArgs {
    pub entity: String,
}
