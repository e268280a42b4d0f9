//! `npm-lite` command-line entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use npm_lite_server::{listing, run_server, Config, StorageLayout};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "npm-lite")]
#[command(about = "Minimal private npm registry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file; built-in defaults apply when it is absent
    #[arg(long, global = true, default_value = "npm-lite.json")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the registry server
    Start {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Storage root for manifests and tarballs
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Print the packages stored under a storage root
    List {
        /// Storage root for manifests and tarballs
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = npm_lite_logging::init_subscriber();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Start { host, port, data } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data) = data {
                config.storage.root = data;
            }

            info!(config = %cli.config.display(), "Starting npm-lite registry");
            run_server(config).await
        }

        Commands::List { data } => {
            let root = data.unwrap_or(config.storage.root);
            for package in listing::list_packages(&StorageLayout::new(root)).await? {
                println!("{}", package);
            }
            Ok(())
        }
    }
}
