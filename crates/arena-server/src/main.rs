//! Arena field monitor - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Arena field monitor and field setup server
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ARENA_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // CLI arg > ARENA_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("ARENA_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    // Logging is configured by the file, so load it first.
    let config = arena_server::AppConfig::from_file(&config_path)?;
    arena_telemetry::init_logging(&config.log_filter)?;

    info!("Starting arena field monitor v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = %config_path,
        port = config.dashboard.port,
        simulation = config.simulation.enabled,
        auth = config.dashboard.auth_enabled(),
        "Configuration loaded"
    );

    arena_server::Application::new(config).run().await?;

    Ok(())
}
