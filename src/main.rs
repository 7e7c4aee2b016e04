//! Taskboard - Main Server
//!
//! Collaborative kanban board with real-time change notifications.

use anyhow::Result;
use clap::{Parser, Subcommand};
use taskboard::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Collaborative task board server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the taskboard server
    Serve {
        /// Port to listen on (overrides config.yaml)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to a YAML config file
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,taskboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, config } => {
            let mut config =
                Config::from_yaml_and_env(config.as_deref().map(std::path::Path::new))?;
            if let Some(port) = port {
                config.server_port = port;
            }
            taskboard::start_server(config).await
        }
    }
}
