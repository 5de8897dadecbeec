use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "secretree", version, about = "Resolve secret-backed configuration fields")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every secret in a schema and print the nested tree
    Resolve(ResolveOpts),
    /// Print the secret requests a schema would make, without fetching
    Discover(DiscoverOpts),
    /// List registered secret stores and RPC endpoints
    Stores,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(clap::Args)]
pub struct ResolveOpts {
    /// Schema document (YAML or JSON)
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Project the secrets belong to
    #[arg(short, long, env = "SECRETREE_PROJECT")]
    pub project: String,
    /// Store name, or rpc:<endpoint>; repeat to build a fallback chain
    #[arg(long = "store", default_value = "env")]
    pub stores: Vec<String>,
    /// Unix socket of an RPC secret provider; replaces --store
    #[arg(long)]
    pub socket: Option<PathBuf>,
    /// Auth token for the RPC provider
    #[arg(long, env = "SECRETREE_RPC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Configuration path that is already populated
    #[arg(long = "skip")]
    pub skip: Vec<String>,
    /// Maximum concurrent lookups (0 = default)
    #[arg(short, long, default_value_t = 0)]
    pub concurrency: usize,
    #[arg(short, long, default_value = ".")]
    pub delimiter: String,
    /// Lowercase every resolved path before merging
    #[arg(long)]
    pub lowercase_keys: bool,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(clap::Args)]
pub struct DiscoverOpts {
    #[arg(short, long)]
    pub schema: PathBuf,
    #[arg(long = "skip")]
    pub skip: Vec<String>,
    #[arg(short, long, default_value = ".")]
    pub delimiter: String,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}
