use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;

/// Bookshelf catalogue service
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// JSON array of books to load at startup (overrides `database.seed_path`)
        #[arg(long)]
        seed: Option<PathBuf>,
        /// Port to listen on (overrides `server.port`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the route table as JSON
    Routes,
    /// Print the effective settings as JSON
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Routes => {
            let routes = shelf_app::books::routes::describe_routes();
            println!("{}", serde_json::to_string_pretty(&routes)?);
            Ok(())
        }
        Command::Config => {
            let settings = load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Serve { seed, port } => {
            let mut settings = load_settings()?;
            if let Some(seed) = seed {
                settings.database.seed_path = Some(seed);
            }
            if let Some(port) = port {
                settings.server.port = port;
            }

            shelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "shelf serve starting");

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(shelf_app::run(settings))
        }
    }
}

fn load_settings() -> anyhow::Result<Settings> {
    Settings::load().with_context(|| "failed to load settings")
}
