//! MCP Bot - terminal chat client
//!
#![doc = "Main entry point for the MCP Bot application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcpbot::app::ChatApp;
use mcpbot::cli::{Cli, Commands};
use mcpbot::commands;
use mcpbot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        None => {
            commands::chat::run_chat(ChatApp::open(config)?, None).await?;
            Ok(())
        }
        Some(Commands::Chat { session }) => {
            if let Some(id) = &session {
                tracing::debug!("Resuming session: {}", id);
            }
            commands::chat::run_chat(ChatApp::open(config)?, session).await?;
            Ok(())
        }
        Some(Commands::Send { text }) => {
            tracing::info!("Sending one-shot message");
            let mut app = ChatApp::open(config)?;
            commands::send(&mut app, &text).await?;
            Ok(())
        }
        Some(Commands::Configure {
            provider,
            api_key,
            model,
        }) => {
            tracing::info!("Configuring provider: {}", provider);
            let mut app = ChatApp::open(config)?;
            commands::configure(&mut app, provider, &api_key, model.as_deref())?;
            Ok(())
        }
        Some(Commands::Sessions { command }) => {
            let mut app = ChatApp::open(config)?;
            commands::sessions::handle_sessions(&mut app, command)?;
            Ok(())
        }
        Some(Commands::Models { provider }) => {
            tracing::info!("Listing model catalog");
            commands::models::list_models(provider, None);
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` takes precedence; otherwise `mcpbot=info`, or `mcpbot=debug`
/// with `--verbose`. Logs go to stderr so they never mix with replies.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "mcpbot=debug" } else { "mcpbot=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
