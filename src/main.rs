// ABOUTME: Entry point for the elevate CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use elevate::config::{self, Config};
use elevate::error::{Error, Result};
use elevate::http;
use elevate::upgrade::SystemUpgrade;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            let path = config::init_config(&cwd, force)?;
            println!("Created {}", path.display());
            Ok(())
        }
        Commands::Serve => {
            let config = load_config(cli.config.as_deref())?;
            serve(config).await
        }
        Commands::Upgrade { license } => {
            let config = load_config(cli.config.as_deref())?;
            let system = SystemUpgrade::from_config(&config);

            system.upgrade(&license).await?;
            println!("Upgrade to {} dispatched", config.version);
            Ok(())
        }
        Commands::Detect => {
            let config = load_config(cli.config.as_deref())?;
            let system = SystemUpgrade::from_config(&config);
            println!("Platform: {}", system.coordinator().platform());

            let endpoint = system.guess_local_endpoint().await?;
            println!("Local endpoint: {} ({})", endpoint.id, endpoint.name);
            Ok(())
        }
    }
}

/// Load the given config file, or discover one in the working directory.
/// Without a file every section takes its defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load(path);
    }

    let cwd = env::current_dir()?;
    match Config::discover(&cwd) {
        Err(Error::ConfigNotFound(dir)) => {
            tracing::info!(dir = %dir.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}

async fn serve(config: Config) -> Result<()> {
    let system = Arc::new(SystemUpgrade::from_config(&config));
    let app = http::router(system);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(listen = %config.listen, "serving upgrade API");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
