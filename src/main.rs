//! pricefinder - live price comparison across configured retailer sources.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricefinder::config::Settings;
use pricefinder::repository::{SourceRepository, TomlSourceRepository};

#[derive(Parser)]
#[command(name = "pricefinder", version, about)]
struct Cli {
    /// Path to the settings file.
    #[arg(long, env = "PRICEFINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web frontend.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one query and print the results as JSON.
    Search { query: String },
    /// List the active sources.
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pricefinder=debug"
    } else {
        "pricefinder=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { host, port } => {
            pricefinder::server::serve(&settings, &host, port).await?;
        }
        Command::Search { query } => {
            let service = settings.build_service()?;
            let products = service.search(&query).await?;
            println!("{}", serde_json::to_string_pretty(&products)?);
        }
        Command::Sources => {
            let repo = Arc::new(TomlSourceRepository::new(settings.sources_file.clone()));
            for source in repo.list_active_sources().await? {
                println!(
                    "{} ({}) [{}] vat={}%",
                    source.name, source.base_url, source.currency, source.included_vat
                );
            }
        }
    }

    Ok(())
}
