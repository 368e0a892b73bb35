// Headless arena client: connects, registers, mirrors remote players and
// logs what it sees. Useful for smoke-testing a server without a renderer.

use clap::Parser;
use client::session::{Session, SessionStatus};
use client::{interp, net::Connection};
use shared::{CharacterClass, ClientMessage};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Headless client for the arena state-sync server")]
struct Args {
    /// WebSocket endpoint of the arena server.
    #[arg(long, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,

    /// Display name, 3-15 characters.
    #[arg(long, default_value = "wanderer")]
    name: String,

    /// Character archetype.
    #[arg(long, value_enum, default_value = "warrior")]
    class: ClassArg,

    /// Walk a slow circle around the spawn point, for exercising a server
    /// with visible movement traffic.
    #[arg(long)]
    wander: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ClassArg {
    Warrior,
    Mage,
}

impl From<ClassArg> for CharacterClass {
    fn from(arg: ClassArg) -> Self {
        match arg {
            ClassArg::Warrior => CharacterClass::Warrior,
            ClassArg::Mage => CharacterClass::Mage,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    // Name validation happens here, before any connection traffic.
    let mut session = match Session::new(&args.name, args.class.into()) {
        Ok(session) => session,
        Err(e) => {
            error!(%e, "refusing to start session");
            return;
        }
    };

    let mut connection = match Connection::open(&args.url).await {
        Ok(connection) => connection,
        Err(e) => {
            error!(%e, "could not reach the server");
            return;
        }
    };

    info!(url = %args.url, name = %session.name(), "connected; registering");
    if connection
        .outgoing
        .send(session.select_character())
        .await
        .is_err()
    {
        error!("connection closed before registration");
        return;
    }

    // Drive interpolation at a render-like cadence while folding in network
    // messages as they arrive.
    let mut render_tick = tokio::time::interval(Duration::from_millis(16));
    let mut chat_seen = 0usize;
    let mut tick_count = 0u64;
    let mut wander_angle = 0.0f32;

    loop {
        tokio::select! {
            message = connection.incoming.recv() => {
                let Some(message) = message else {
                    info!("server closed the connection");
                    break;
                };
                if session.handle_message(message, now_ms()) == SessionStatus::Kicked {
                    info!("kicked from the server; session over");
                    break;
                }
                for line in &session.chat_log()[chat_seen..] {
                    info!(sender = %line.sender, message = %line.message, "chat");
                }
                chat_seen = session.chat_log().len();
            }
            _ = render_tick.tick() => {
                if let Some(mirror) = session.mirror_mut() {
                    interp::advance(mirror, now_ms());
                }
                tick_count += 1;

                // One movement update roughly every 128 ms, matching the pace
                // of a slow walk rather than flooding the server.
                if args.wander && session.local_spawned() && tick_count % 8 == 0 {
                    wander_angle += 0.05;
                    // try_send: a full queue just drops the update, and the
                    // next one supersedes it.
                    let _ = connection.outgoing.try_send(ClientMessage::Move {
                        x: 2.0 * wander_angle.cos(),
                        y: -2.0,
                        z: 2.0 * wander_angle.sin(),
                    });
                    let _ = connection.outgoing.try_send(ClientMessage::Rotate {
                        angle: wander_angle,
                    });
                }
            }
        }
    }

    // Explicitly drop the sender so the writer task closes the socket.
    drop(connection.outgoing);
    tokio::time::sleep(Duration::from_millis(100)).await;
}
