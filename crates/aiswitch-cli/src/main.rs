//! aiswitch console
//!
//! Terminal administration for an aiswitch backend:
//! - Providers: list, add, edit, delete, toggle the active provider
//! - Presets: list, edit overrides, create, select
//! - Logs: browse pages and review transcripts
//!
//! Usage:
//! ```bash
//! # Against the default backend (http://localhost:3400/api/)
//! aiswitch providers list
//!
//! # Create a preset and set two overrides
//! aiswitch presets edit local --create "Low Temp" --set temperature=0.2 --set top_k=40
//!
//! # Review a logged exchange
//! aiswitch logs show 42
//! ```

mod cli;
mod commands;
mod config;
mod render;

use aiswitch_client::{ClientError, ConsoleStore, HttpConsoleApi};
use clap::Parser;
use cli::Cli;
use config::ConsoleConfig;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    let mut config = ConsoleConfig::load(cli.config.as_deref())?;

    // Merge environment variables (they override config file)
    config.merge_env();

    // CLI flags have the highest precedence
    if let Some(url) = cli.url {
        config.api.url = url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Diagnostics go to stderr so stdout stays clean for command output
    let filter = EnvFilter::new(format!("{}", config.log_level()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Using backend at {}", config.api.url);
    let api = HttpConsoleApi::new(config.api_config())?;
    let store = Arc::new(ConsoleStore::new(Arc::new(api)));

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout().lock();
    commands::run(cli.command, &store, &mut input, &mut out).await
}

/// Validation failures are listed per field; everything else prints its
/// context chain
fn report_error(err: &anyhow::Error) {
    let core = err
        .downcast_ref::<aiswitch_core::Error>()
        .or_else(|| match err.downcast_ref::<ClientError>() {
            Some(ClientError::Core(core)) => Some(core),
            _ => None,
        });

    if let Some(aiswitch_core::Error::Validation(errors)) = core {
        eprintln!("Validation failed, nothing was sent:");
        let _ = render::write_validation(&mut std::io::stderr(), errors);
    } else {
        eprintln!("Error: {:#}", err);
    }
}
