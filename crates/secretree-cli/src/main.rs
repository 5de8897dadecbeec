use clap::Parser;
use tracing::info;

use secretree_core::logging;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(opts) => {
            let store = commands::select_store(&opts)?;
            info!(store = store.name(), project = %opts.project, "resolving secrets");
            println!("{}", commands::resolve(&opts, store)?);
        }
        Commands::Discover(opts) => {
            println!("{}", commands::discover(&opts)?);
        }
        Commands::Stores => {
            println!("{}", commands::stores());
        }
    }

    Ok(())
}
