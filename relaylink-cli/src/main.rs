use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use relaylink_client::{Client, ClientConfig, ClientEvent, PeerId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relaylink")]
#[command(about = "Peer-to-peer rooms over a signaling relay")]
struct Cli {
    /// WebSocket URL of the relay.
    #[arg(long, global = true, default_value = "ws://127.0.0.1:3000/ws")]
    relay: String,

    /// Display name shown to the host.
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a room and admit guests.
    Host {
        /// Admit every guest without asking.
        #[arg(long)]
        auto_approve: bool,
    },
    /// Join a room by its code.
    Join { code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let auto_approve = matches!(cli.command, Commands::Host { auto_approve: true });
    let mut config = ClientConfig {
        relay_url: cli.relay.clone(),
        auto_approve,
        ..ClientConfig::default()
    };
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }

    let (client, events) = Client::connect(config)
        .await
        .with_context(|| format!("Failed to connect to relay at {}", cli.relay))?;

    let prompt_for_guests = match &cli.command {
        Commands::Host { auto_approve } => {
            let reply = client.create_room().await.context("createRoom failed")?;
            let code = reply.code.context("Relay returned no room code")?;
            println!("{} {}", "Room code:".green().bold(), code.bold());
            !auto_approve
        }
        Commands::Join { code } => {
            let reply = client
                .join_room(code, cli.name.as_deref())
                .await
                .context("joinRoom failed")?;
            if !reply.success {
                bail!("Room {} did not accept the join", code);
            }
            println!("{}", "Waiting for the host to let you in...".cyan());
            false
        }
    };

    let result = run(&client, events, prompt_for_guests).await;
    client.disconnect().await;
    result
}

async fn run(
    client: &Client,
    mut events: mpsc::UnboundedReceiver<ClientEvent>,
    prompt_for_guests: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if !handle_event(client, event, prompt_for_guests).await? {
                    break;
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                if client.broadcast(line).await == 0 {
                    println!("{}", "No open channels yet".yellow());
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

/// Returns `false` once the session is over.
async fn handle_event(client: &Client, event: ClientEvent, prompt_for_guests: bool) -> Result<bool> {
    match event {
        ClientEvent::PeerRequest { peer_id, name } => {
            let who = name.unwrap_or_else(|| peer_id.to_string());
            println!("{} {}", "Join request from".cyan(), who.bold());
            if prompt_for_guests {
                let admit = ask(format!("Let {} in?", who)).await?;
                client.approve_peer(&peer_id, admit).await?;
            }
        }
        ClientEvent::PeerApproved { .. } => println!("{}", "Admitted to the room".green()),
        ClientEvent::PeerDenied => {
            println!("{}", "The host declined".red());
            return Ok(false);
        }
        ClientEvent::PeerConnected { peer_id } => {
            println!("{} {}", prefix(&peer_id), "connected".green());
        }
        ClientEvent::PeerDisconnected { peer_id } => {
            println!("{} {}", prefix(&peer_id), "left".yellow());
        }
        ClientEvent::PeerConnectionState { peer_id, state } => {
            tracing::debug!("{} is {}", peer_id, state);
        }
        ClientEvent::DataChannelOpen { peer_id, label } => {
            println!("{} channel '{}' open", prefix(&peer_id), label);
        }
        ClientEvent::DataChannelClose { peer_id } => {
            println!("{} channel closed", prefix(&peer_id));
        }
        ClientEvent::DataChannelMessage { peer_id, message } => match message.as_text() {
            Some(text) => println!("{} {}", prefix(&peer_id), text),
            None => println!("{} <{} bytes>", prefix(&peer_id), message.len()),
        },
        ClientEvent::HostDisconnected => println!("{}", "Host connection lost".yellow()),
        ClientEvent::HostReconnected { .. } => println!("{}", "Host is back".green()),
        ClientEvent::Connected => {}
        ClientEvent::Disconnected => {
            println!("{}", "Disconnected from relay".red());
            return Ok(false);
        }
    }
    Ok(true)
}

async fn ask(prompt: String) -> Result<bool> {
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::new().with_prompt(prompt).default(true).interact()
    })
    .await??;
    Ok(answer)
}

fn prefix(peer_id: &PeerId) -> ColoredString {
    format!("[{}]", peer_id).magenta().bold()
}
