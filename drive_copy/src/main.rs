//! drive_copy CLI - Copy a Google Drive folder, with permissions, to another folder.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use drive_copy::config::{DEFAULT_CLIENT_SECRETS, DEFAULT_TOKEN_FILE, TOKEN_FILE_ENV};
use drive_copy::progress::Progress;
use drive_copy::{extract_folder_id, Authenticator, DriveClient, TokenStore, TreeCopier};

/// Copy a Google Drive folder to another folder or Shared Drive with OAuth.
#[derive(Parser)]
#[command(name = "drive_copy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OAuth 2.0 client secrets file.
    #[arg(long, env = "DRIVE_COPY_CLIENT_SECRETS", default_value = DEFAULT_CLIENT_SECRETS)]
    client_secrets: PathBuf,

    /// Source folder URL or ID.
    #[arg(long)]
    src: String,

    /// Destination folder URL or ID.
    #[arg(long)]
    dst: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("\n✗ Fatal error: {:#}\n", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let source = extract_folder_id(&cli.src)
        .with_context(|| format!("Invalid source folder: {}", cli.src))?;
    let destination = extract_folder_id(&cli.dst)
        .with_context(|| format!("Invalid destination folder: {}", cli.dst))?;

    let token_file = std::env::var_os(TOKEN_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

    let auth = Authenticator::authenticate(&cli.client_secrets, TokenStore::new(token_file))
        .await
        .with_context(|| {
            format!(
                "Failed to authenticate with client secrets {:?}",
                cli.client_secrets
            )
        })?;

    let progress = Progress::new();
    let copier = TreeCopier::new(DriveClient::new(auth)).with_progress(progress);

    progress.started(&source, &destination);
    copier
        .copy(&source, &destination)
        .await
        .with_context(|| format!("Failed to list source folder: {}", source))?;
    progress.finished();

    Ok(())
}

/// Diagnostics go to stderr so stdout stays the progress transcript.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
