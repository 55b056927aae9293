//! Taskpad CLI - to-do list client

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::Commands;
use config::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taskpad_core::{FileTokenStore, TokenStore};
use taskpad_http::{Gateway, SessionStore, TaskClient};
use tracing_subscriber::EnvFilter;

/// Taskpad - a to-do list client
#[derive(Parser)]
#[command(name = "taskpad")]
#[command(about = "A to-do list client for the Taskpad REST backend")]
#[command(version)]
struct Cli {
    /// Backend API base URL (also read from TASKPAD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Token file location (defaults to the platform data dir)
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskpad=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.api_url, cli.token_file)?;
    tracing::debug!(api_url = %settings.api_url, token_file = %settings.token_file.display(), "resolved settings");

    let client = TaskClient::builder()
        .base_url(&settings.api_url)
        .timeout(Duration::from_secs(30))
        .build()?;
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(&settings.token_file));
    let session = SessionStore::new(client.clone(), store);
    let gateway = Gateway::new(client, session.clone()).on_session_expired(|| {
        eprintln!("Session expired. Run `taskpad login <username>` to continue.");
    });

    cli.command.execute(&session, &gateway).await
}
