use crate::domain::PlayerId;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_connection_id;
use crate::interface_adapters::wire::{self, Delivery, WireEvent};
use crate::use_cases::{ArenaEvent, OutboundEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use shared::{ClientMessage, ServerMessage, validate_name};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    EventsClosed,
    OutboundClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Serializes each arena outbound event once and broadcasts the shared frame.
///
/// The arena leg is an unbounded queue: snapshots and kick notices are
/// structural and must all reach the serializer, so this hop never drops.
/// The per-connection broadcast after it is the only lossy hop, and the
/// watch channel keeps the latest snapshot so lagging connections can be
/// resynced without replaying missed deltas.
pub async fn outbound_serializer(
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundEvent>,
    wire_tx: broadcast::Sender<WireEvent>,
    snapshot_latest_tx: watch::Sender<Utf8Bytes>,
) {
    while let Some(event) = outbound_rx.recv().await {
        let is_snapshot = matches!(event, OutboundEvent::Snapshot(_));
        let frame = match wire::encode(event) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = ?e, "failed to serialize outbound event");
                continue;
            }
        };

        if is_snapshot {
            // Store the latest snapshot bytes for lag recovery.
            let _ = snapshot_latest_tx.send(frame.payload.clone());
        }
        let _ = wire_tx.send(frame);
    }
    warn!("outbound channel closed; serializer exiting");
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let player_id = next_connection_id();
    let span = info_span!("conn", player_id);
    let _enter = span.enter();

    let mut ctx = match bootstrap_connection(&mut socket, &state, player_id).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "bootstrap failed".into(),
                })))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    info!("client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub event_tx: mpsc::Sender<ArenaEvent>,
    pub wire_rx: broadcast::Receiver<WireEvent>,
    pub snapshot_latest_rx: watch::Receiver<Utf8Bytes>,
    // Set once the connection has registered a player record.
    pub has_joined: bool,
    pub was_kicked: bool,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub invalid_json: u32,

    pub last_event_full_log: Instant,
    pub last_invalid_input_log: Instant,
    pub last_lag_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
    player_id: PlayerId,
) -> Result<ConnCtx, NetError> {
    // Subscribe before any await so no broadcast frame is missed between
    // the handshake and the main loop.
    let wire_rx = state.wire_tx.subscribe();
    let snapshot_latest_rx = state.snapshot_latest_tx.subscribe();

    // Tell the client "this is who you are" before the first snapshot, so it
    // can match its own record in `players` lists.
    let identity = ServerMessage::Identity {
        player_id: player_id.to_string(),
    };
    send_message(socket, &identity).await?;

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        event_tx: state.event_tx.clone(),
        wire_rx,
        snapshot_latest_rx,
        has_joined: false,
        was_kicked: false,

        msgs_in: 0,
        msgs_out: 0,
        invalid_json: 0,

        last_event_full_log: now,
        last_invalid_input_log: now,
        last_lag_log: now,

        close_frame: None,
    })
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        event_tx,
        wire_rx,
        snapshot_latest_rx,
        has_joined,
        was_kicked,
        msgs_in,
        msgs_out,
        invalid_json,
        last_event_full_log,
        last_invalid_input_log,
        last_lag_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // Incoming message from the client.
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    player_id,
                    event_tx,
                    has_joined,
                    msgs_in,
                    invalid_json,
                    last_event_full_log,
                    last_invalid_input_log,
                    close_frame,
                ).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing frame from the arena.
            frame = wire_rx.recv() => {
                match frame {
                    Ok(frame) => {
                        match forward_wire_event(frame, socket, player_id, msgs_out).await {
                            Ok(LoopControl::Continue) => false,
                            Ok(LoopControl::Disconnect) => {
                                // Kick path: notice already sent, close politely.
                                *was_kicked = true;
                                *close_frame = Some(CloseFrame {
                                    code: close_code::POLICY,
                                    reason: "kicked".into(),
                                });
                                true
                            }
                            Err(_) => true,
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Deltas are droppable by design: abandon whatever was
                        // missed and resync from the latest snapshot.
                        if should_log(last_lag_log) {
                            warn!(missed = n, "outbound frames lagged; resyncing from snapshot");
                        }
                        let latest = snapshot_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else if socket.send(Message::Text(latest)).await.is_err() {
                            true
                        } else {
                            *msgs_out += 1;
                            false
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::OutboundClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        player_id,
        event_tx,
        *has_joined,
        *was_kicked,
        *msgs_in,
        *msgs_out,
        *invalid_json,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    if let Some(err) = fatal {
        Err(err)
    } else {
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    player_id: PlayerId,
    event_tx: &mpsc::Sender<ArenaEvent>,
    has_joined: &mut bool,
    msgs_in: &mut u64,
    invalid_json: &mut u32,
    last_event_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => {
                        handle_client_message(
                            message,
                            player_id,
                            event_tx,
                            has_joined,
                            last_event_full_log,
                            last_invalid_input_log,
                        )
                        .await
                    }
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn handle_client_message(
    message: ClientMessage,
    player_id: PlayerId,
    event_tx: &mpsc::Sender<ArenaEvent>,
    has_joined: &mut bool,
    last_event_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match message {
        ClientMessage::SelectCharacter { name, class } => {
            if *has_joined {
                // Name and class are immutable for the session.
                if should_log(last_invalid_input_log) {
                    warn!("duplicate character selection ignored");
                }
                return Ok(LoopControl::Continue);
            }

            // Reject at the boundary; the registry re-checks, but a bad name
            // should never produce arena traffic.
            let name = match validate_name(&name) {
                Ok(name) => name,
                Err(reason) => {
                    if should_log(last_invalid_input_log) {
                        warn!(%reason, "invalid display name; registration rejected");
                    }
                    return Ok(LoopControl::Continue);
                }
            };

            event_tx
                .send(ArenaEvent::Join {
                    player_id,
                    name,
                    class,
                })
                .await
                .map_err(|_| NetError::EventsClosed)?;
            *has_joined = true;
            Ok(LoopControl::Continue)
        }
        ClientMessage::Move { x, y, z } => {
            if !*has_joined {
                if should_log(last_invalid_input_log) {
                    warn!("movement before character selection ignored");
                }
                return Ok(LoopControl::Continue);
            }
            if !(x.is_finite() && y.is_finite() && z.is_finite()) {
                if should_log(last_invalid_input_log) {
                    warn!("non-finite position dropped");
                }
                return Ok(LoopControl::Continue);
            }

            // Movement is droppable: if the arena is saturated, losing this
            // update is fine because the next one supersedes it.
            try_send_droppable(
                event_tx,
                ArenaEvent::Move {
                    player_id,
                    position: shared::Vec3::new(x, y, z),
                },
                last_event_full_log,
            )
        }
        ClientMessage::Rotate { angle } => {
            if !*has_joined {
                if should_log(last_invalid_input_log) {
                    warn!("rotation before character selection ignored");
                }
                return Ok(LoopControl::Continue);
            }
            if !angle.is_finite() {
                if should_log(last_invalid_input_log) {
                    warn!("non-finite rotation dropped");
                }
                return Ok(LoopControl::Continue);
            }

            try_send_droppable(
                event_tx,
                ArenaEvent::Rotate {
                    player_id,
                    rotation: angle,
                },
                last_event_full_log,
            )
        }
        ClientMessage::ChatMessage { message } => {
            if !*has_joined {
                return Ok(LoopControl::Continue);
            }
            event_tx
                .send(ArenaEvent::Chat { player_id, message })
                .await
                .map_err(|_| NetError::EventsClosed)?;
            Ok(LoopControl::Continue)
        }
        ClientMessage::KickPlayer { target_id } => {
            if !*has_joined {
                return Ok(LoopControl::Continue);
            }
            // Unparseable target ids cannot match a registered player; same
            // silent-drop policy as an unknown id.
            let Ok(target) = target_id.parse::<PlayerId>() else {
                debug!(%target_id, "kick with malformed target id dropped");
                return Ok(LoopControl::Continue);
            };
            event_tx
                .send(ArenaEvent::Kick {
                    requester: player_id,
                    target,
                })
                .await
                .map_err(|_| NetError::EventsClosed)?;
            Ok(LoopControl::Continue)
        }
    }
}

fn try_send_droppable(
    event_tx: &mpsc::Sender<ArenaEvent>,
    event: ArenaEvent,
    last_event_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match event_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_)) => {
            if should_log(last_event_full_log) {
                warn!("event channel full; dropping update");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::EventsClosed),
    }
}

/// Forwards a serialized frame if it applies to this connection.
///
/// Returns `Disconnect` (without an error) when the frame was a kick notice
/// for this connection: the notice is sent first, then the caller closes.
async fn forward_wire_event(
    frame: WireEvent,
    socket: &mut WebSocket,
    player_id: PlayerId,
    msgs_out: &mut u64,
) -> Result<LoopControl, NetError> {
    if !frame.applies_to(player_id) {
        return Ok(LoopControl::Continue);
    }

    let is_kick = matches!(frame.delivery, Delivery::KickTarget(_));
    socket
        .send(Message::Text(frame.payload))
        .await
        .map_err(NetError::Ws)?;
    *msgs_out += 1;

    if is_kick {
        info!("kick notice delivered; closing connection");
        Ok(LoopControl::Disconnect)
    } else {
        Ok(LoopControl::Continue)
    }
}

async fn disconnect_cleanup(
    player_id: PlayerId,
    event_tx: &mpsc::Sender<ArenaEvent>,
    has_joined: bool,
    was_kicked: bool,
    msgs_in: u64,
    msgs_out: u64,
    invalid_json: u32,
) -> Result<(), NetError> {
    if has_joined {
        // Unregister is idempotent in the arena, so this is safe even when
        // the record is already gone (e.g. after a kick).
        event_tx
            .send(ArenaEvent::Leave { player_id })
            .await
            .map_err(|_| NetError::EventsClosed)?;
    }

    debug!(
        msgs_in,
        msgs_out, invalid_json, was_kicked, "connection stats"
    );
    info!("client disconnected");
    Ok(())
}
