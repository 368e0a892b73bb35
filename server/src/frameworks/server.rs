// Framework bootstrap for the arena server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::{outbound_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::wire::WireEvent;
use crate::use_cases::arena::{ArenaSettings, arena_task};
use crate::use_cases::{ArenaEvent, OutboundEvent};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    // event_tx/rx: all client events funnel into the single arena task.
    let (event_tx, event_rx) = mpsc::channel::<ArenaEvent>(config::EVENT_CHANNEL_CAPACITY);

    // outbound_tx: domain-level events produced by the arena task. Unbounded
    // so membership snapshots and kick notices are never dropped before they
    // reach the serializer.
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<OutboundEvent>();

    // wire_tx: serialized frames shared across all connections.
    let (wire_tx, _wire_rx) = broadcast::channel::<WireEvent>(config::WIRE_BROADCAST_CAPACITY);

    // snapshot_latest: most recent serialized snapshot, for lag recovery.
    let (snapshot_latest_tx, _snapshot_latest_rx) = watch::channel(Utf8Bytes::from(""));

    let settings = ArenaSettings {
        bounds: config::arena_bounds(),
        spawn_point: config::spawn_point(),
        admin_names: config::admin_names(),
        gravity: config::gravity(),
        tick_interval: config::TICK_INTERVAL,
    };

    let shutdown = Arc::new(tokio::sync::Notify::new());

    // Spawn the arena task; it is the single owner of the player registry.
    tokio::spawn(arena_task(
        event_rx,
        outbound_tx.clone(),
        settings,
        shutdown.clone(),
    ));

    // Spawn the serializer that turns outbound events into shared frames.
    tokio::spawn(outbound_serializer(
        outbound_rx,
        wire_tx.clone(),
        snapshot_latest_tx.clone(),
    ));

    Arc::new(AppState {
        event_tx,
        wire_tx,
        snapshot_latest_tx,
    })
}
