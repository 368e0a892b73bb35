use crate::interface_adapters::wire::WireEvent;
use crate::use_cases::ArenaEvent;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Events flowing from connections into the arena task.
    pub event_tx: mpsc::Sender<ArenaEvent>,
    // Serialized frames produced by the outbound serializer, shared across
    // all connections.
    pub wire_tx: broadcast::Sender<WireEvent>,
    // Latest serialized snapshot, used to resync connections that lag.
    pub snapshot_latest_tx: watch::Sender<Utf8Bytes>,
}
