use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info, warn};

use gistchat::chat::{SessionOptions, SyncEngine};
use gistchat::console::{confirm, run_session, ConsoleTranscript};
use gistchat::{Config, GistClient};

/// Chat in the terminal over the comments of a secret gist.
#[derive(Debug, Parser)]
#[command(name = "gistchat", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "gistchat.toml")]
    config: PathBuf,

    /// Room to join. Omit to create a new room.
    room: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = gistchat::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        gistchat::logging::init_stderr(&config.logging.level);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Config) -> gistchat::Result<()> {
    let client = GistClient::new(&config.github)?;
    let username = client.resolve_local_identity().await?;
    info!("Resolved local identity: {}", username);

    let mut stdin = BufReader::new(tokio::io::stdin());

    let (room_id, created) = match cli.room {
        Some(room_id) => (room_id, false),
        None => {
            let room_id = client.create_room(&username).await?;
            info!("Created room {}", room_id);
            println!(
                "created chat room. others can join with `{} {}`",
                config.chat.invite_command, room_id
            );

            // Ctrl-C at the prompt declines, so the room is still cleaned up.
            let mut stdout = std::io::stdout();
            let answer = tokio::select! {
                answer = confirm("continue into chat room?", &mut stdin, &mut stdout) => answer,
                Ok(()) = tokio::signal::ctrl_c() => Ok(false),
            };
            match answer {
                Ok(true) => (room_id, true),
                Ok(false) => {
                    cleanup_room(&client, &room_id).await;
                    return Ok(());
                }
                Err(e) => {
                    cleanup_room(&client, &room_id).await;
                    return Err(e);
                }
            }
        }
    };

    let transcript = Arc::new(ConsoleTranscript::new(std::io::stdout()));
    let engine = Arc::new(SyncEngine::new(
        room_id.clone(),
        username,
        Arc::new(client.comments(room_id.clone())),
        transcript,
        SessionOptions::from_config(&config.chat),
    ));

    let result = run_session(engine, stdin).await;

    if created {
        cleanup_room(&client, &room_id).await;
    }
    result
}

/// Delete a room we created. Failures are reported, never fatal.
async fn cleanup_room(client: &GistClient, room_id: &str) {
    match client.delete_room(room_id).await {
        Ok(()) => info!("Deleted room {}", room_id),
        Err(e) => {
            warn!("Failed to clean up room {}: {}", room_id, e);
            eprintln!("failed to cleanup gist {room_id}: {e}");
        }
    }
}
