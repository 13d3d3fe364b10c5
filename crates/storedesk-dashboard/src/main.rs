//! `storedesk` admin console
//!
//! Runs one resource command and exits, or opens the interactive shell when
//! no command is given.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use anyhow::{Context as _, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;
use storedesk_client::ApiClient;
use storedesk_core::Config;
use storedesk_core::config::LoggingConfig;
use storedesk_dashboard::commands::{Cli, Commands};
use storedesk_dashboard::{App, AutoConfirm, Confirm, Context, StdinConfirm, app};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&cli, &config.logging)?;

    if cli.email.is_some() {
        config.auth.email.clone_from(&cli.email);
    }
    if cli.password.is_some() {
        config.auth.password.clone_from(&cli.password);
    }

    let client = ApiClient::from_config(&config.api).context("Failed to build HTTP client")?;
    let ctx = Context::new(client, config.dashboard.clone(), confirmer(cli.yes));
    let mut app = App::new(config, ctx, app::terminal_columns());
    let mut stdout = std::io::stdout();

    match cli.command {
        Some(Commands::Config { show }) => app.show_config(show, &mut stdout),
        Some(Commands::Shell) | None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            app.run_shell(stdin, &mut stdout).await
        }
        Some(command) => {
            app.ensure_session(&mut stdout).await?;
            if app.execute(command, &mut stdout).await? {
                Ok(())
            } else {
                std::process::exit(1);
            }
        }
    }
}

/// Initialize logging; command-line flags override the logging section
fn init_logging(cli: &Cli, config: &LoggingConfig) -> Result<()> {
    let format = if cli.json {
        "json".to_string()
    } else {
        cli.log_format.clone().unwrap_or_else(|| config.format.clone())
    };
    let logging = LoggingConfig {
        level: cli.log_level.clone().unwrap_or_else(|| config.level.clone()),
        format,
    };
    storedesk_core::init_logging(&logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %logging.level,
        "storedesk starting"
    );
    Ok(())
}

/// Destructive actions prompt on a terminal; piped input declines unless `--yes`
fn confirmer(yes: bool) -> Arc<dyn Confirm> {
    if yes {
        Arc::new(AutoConfirm(true))
    } else if std::io::stdin().is_terminal() {
        Arc::new(StdinConfirm)
    } else {
        tracing::info!("stdin is not a terminal; destructive actions need --yes");
        Arc::new(AutoConfirm(false))
    }
}
