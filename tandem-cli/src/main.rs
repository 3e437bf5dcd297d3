use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use tandem_core::RoomId;
use tandem_peer::{PeerEvent, RtcTransportFactory, TransportConfig, run_client};
use tandem_server::{BrokerConfig, SignalingService, serve};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Pairs two peers per room and lets them talk directly")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling broker.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "TANDEM_BIND")]
        bind: Option<String>,

        /// Port to listen on; replaces the port of the bind address.
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Room for clients that join without naming one.
        #[arg(long, env = "TANDEM_DEFAULT_ROOM")]
        default_room: Option<String>,
    },

    /// Join a room and chat with whoever else is in it.
    Chat {
        #[arg(long, default_value = "ws://127.0.0.1:3000/ws")]
        url: String,

        /// Asked for interactively when omitted.
        #[arg(long)]
        room: Option<String>,

        /// Skip STUN and only use host candidates.
        #[arg(long)]
        local: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Serve {
            bind,
            port,
            default_room,
        } => run_serve(bind, port, default_room).await,
        Commands::Chat { url, room, local } => run_chat(url, room, local).await,
    }
}

async fn run_serve(bind: Option<String>, port: Option<u16>, default_room: Option<String>) -> Result<()> {
    let mut config = BrokerConfig::default();
    config.bind_address = resolve_bind(bind, port, &config.bind_address);
    if let Some(room) = default_room {
        config.default_room = RoomId::or_default(Some(&room), &config.default_room);
    }

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    println!("{}", "📡 Starting tandem broker...".green().bold());
    println!("   🏠 Default room: {}", config.default_room);
    println!("   🔌 Listening on: {}", listener.local_addr()?);

    let service = SignalingService::new(config);
    serve(listener, service, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    println!("{}", "👋 Broker stopped".cyan());
    Ok(())
}

fn resolve_bind(bind: Option<String>, port: Option<u16>, fallback: &str) -> String {
    let address = bind.unwrap_or_else(|| fallback.to_string());
    match port {
        Some(port) => {
            let host = address
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or(&address);
            format!("{host}:{port}")
        }
        None => address,
    }
}

async fn run_chat(url: String, room: Option<String>, local: bool) -> Result<()> {
    let room = match room {
        Some(room) => Some(room),
        None => prompt_room().await?,
    };

    let config = if local {
        TransportConfig::local()
    } else {
        TransportConfig::default()
    };

    let (input_tx, input_rx) = mpsc::channel::<Bytes>(32);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.is_empty() {
                continue;
            }
            if input_tx.send(Bytes::from(line)).await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            print_event(event);
        }
    });

    println!("{}", format!("🔗 Connecting to {url}...").cyan());
    run_client(&url, room, RtcTransportFactory::new(config), input_rx, events_tx).await
}

async fn prompt_room() -> Result<Option<String>> {
    let room = tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Room (empty for the default)")
            .allow_empty(true)
            .interact_text()
    })
    .await??;

    let room = room.trim();
    Ok((!room.is_empty()).then(|| room.to_string()))
}

fn print_event(event: PeerEvent) {
    match event {
        PeerEvent::Welcome(id) => println!("{} {}", "✅ Connected as".green(), id),
        PeerEvent::RoleAssigned { room, role } => {
            println!("{}", format!("🏠 Joined {room} as {role}").green().bold())
        }
        PeerEvent::PeerJoined(id) => println!("{} {}", "👋 Peer joined:".cyan(), id),
        PeerEvent::JoinRejected { room, reason } => {
            println!("{}", format!("⛔ Could not join {room}: {reason}").red().bold())
        }
        PeerEvent::ChannelReady => {
            println!("{}", "✨ Channel open, start typing".green().bold())
        }
        PeerEvent::NegotiationFailed { reason } => {
            println!("{}", format!("⚠️  Negotiation failed: {reason}").yellow())
        }
        PeerEvent::CandidateRejected { reason } => {
            println!("{}", format!("⚠️  Candidate rejected: {reason}").yellow())
        }
        PeerEvent::Message(data) => {
            println!("{} {}", "peer>".magenta().bold(), String::from_utf8_lossy(&data))
        }
        PeerEvent::ChannelClosed => println!("{}", "🔌 Peer disconnected".yellow()),
    }
}
