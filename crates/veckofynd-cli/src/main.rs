use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod scrape;

#[derive(Debug, Parser)]
#[command(name = "veckofynd")]
#[command(about = "Weekly grocery offer extraction")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape all configured stores and write the offer list.
    Scrape {
        /// Write the offer list here instead of the configured path.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Read the store list from here instead of the configured path.
        #[arg(long)]
        stores: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = veckofynd_core::load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let command = cli.command.unwrap_or(Commands::Scrape {
        output: None,
        stores: None,
    });
    match command {
        Commands::Scrape { output, stores } => {
            if let Some(path) = stores {
                config.stores_path = path;
            }
            if let Some(path) = output {
                config.output_path = path;
            }
            scrape::run(&config).await
        }
    }
}
