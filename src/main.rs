//! Sheetchat - chat with the tables of a spreadsheet
//!
#![doc = "Sheetchat - chat with the tables of a spreadsheet"]
#![doc = "Main entry point for the Sheetchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sheetchat::cli::{Cli, Commands};
use sheetchat::commands;
use sheetchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first so --verbose can shape logging
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Serve { .. } => {
            tracing::info!("Starting web server");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Chat { url } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(u) = &url {
                tracing::debug!("Loading spreadsheet on start: {}", u);
            }
            commands::chat::run_chat(config, url).await?;
            Ok(())
        }
    }
}

/// Initialize tracing/logging
///
/// `RUST_LOG` wins when set; otherwise `sheetchat=info`, or `sheetchat=debug`
/// with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sheetchat=debug,tower_http=debug"
    } else {
        "sheetchat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
