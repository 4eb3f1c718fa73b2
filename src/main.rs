use clap::{Parser, Subcommand};
use configuration::load_config;
use database::{PoolSettings, connect, run_migrations};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the RondaGuard backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables from .env file, if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => handle_serve(args).await?,
        Commands::Migrate => handle_migrate().await?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// The patrol-operations backend: accounts, checklists, tasks, and the
/// round history they produce.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate,
}

#[derive(Parser)]
struct ServeArgs {
    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    web_server::run_server(&config).await
}

/// Applies migrations without starting the server, for deploy pipelines
/// that migrate ahead of the rollout.
async fn handle_migrate() -> anyhow::Result<()> {
    let config = load_config()?;
    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
    };

    let pool = connect(&settings).await?;
    run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations applied.");
    Ok(())
}
