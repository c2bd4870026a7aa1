//! `dma-cli` — command-line driver for the DMA session core.
//!
//! Exercises the full authentication lifecycle against a live backend:
//! login, register, whoami (bootstrap + verify), profile update, logout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use dma_client::api::ApiClient;
use dma_client::error::{ApiError, StoreError};
use dma_client::session::{SessionConfig, SessionController};
use dma_client::store::{CredentialStore, FileStore};

/// Whoami should fail fast instead of retrying forever on a dead network.
const CLI_RETRY_LIMIT: u32 = 3;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("api request failed: {0}")]
    Api(#[from] ApiError),
    #[error("credential store failed: {0}")]
    Store(#[from] StoreError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not signed in")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "dma-cli", about = "DMA API session CLI")]
struct Cli {
    #[arg(long, env = "DMA_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    /// Credential file; defaults to the platform config directory.
    #[arg(long, env = "DMA_CREDENTIALS_FILE")]
    credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        email: String,
        password: String,
    },
    /// Create an account; signs in immediately on success.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Verify the stored session and print the current user.
    Whoami,
    /// Print the stored credentials without a network call.
    Status,
    Profile(ProfileCommand),
    /// Sign out and clear stored credentials.
    Logout,
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    /// Update profile fields from a JSON object.
    Update {
        #[arg(long)]
        data: String,
    },
    /// Upload a profile picture from a file.
    Picture {
        file: PathBuf,
        #[arg(long, default_value = "image/jpeg")]
        content_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = FileStore::new(
        cli.credentials_file
            .unwrap_or_else(FileStore::default_path),
    );

    if let Command::Status = cli.command {
        return run_status(&store);
    }

    let gateway = Arc::new(ApiClient::new(cli.base_url)?);
    let controller = SessionController::new(
        store,
        gateway,
        SessionConfig {
            retry_delay: Duration::from_millis(2000),
            retry_limit: Some(CLI_RETRY_LIMIT),
        },
    );

    match cli.command {
        Command::Login { email, password } => {
            let user = controller.login(&email, &password).await?;
            print_json(&serde_json::to_value(&user)?)?;
        }
        Command::Register { name, email, password } => {
            let fields = serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            });
            let user = controller.register(&fields).await?;
            print_json(&serde_json::to_value(&user)?)?;
        }
        Command::Whoami => {
            controller.bootstrap().await;
            let session = controller.current();
            let user = session.user.ok_or(CliError::NotSignedIn)?;
            print_json(&serde_json::to_value(&user)?)?;
        }
        Command::Profile(profile) => {
            controller.bootstrap().await;
            if !controller.current().is_authenticated() {
                return Err(CliError::NotSignedIn);
            }
            match profile.command {
                ProfileSubcommand::Update { data } => {
                    let fields = serde_json::from_str(&data)?;
                    let user = controller.update_profile(&fields).await?;
                    print_json(&serde_json::to_value(&user)?)?;
                }
                ProfileSubcommand::Picture { file, content_type } => {
                    let bytes = std::fs::read(&file)?;
                    let user = controller
                        .upload_profile_picture(bytes, &content_type)
                        .await?;
                    print_json(&serde_json::to_value(&user)?)?;
                }
            }
        }
        Command::Logout => {
            controller.logout();
            eprintln!("signed out");
        }
        Command::Status => unreachable!("handled above"),
    }

    Ok(())
}

fn run_status(store: &FileStore) -> Result<(), CliError> {
    let credentials = store.load();
    let summary = serde_json::json!({
        "signed_in": credentials.token.is_some(),
        "user": credentials.user,
    });
    print_json(&summary)?;
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
