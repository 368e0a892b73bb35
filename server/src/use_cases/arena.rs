// The arena task: single owner of the player registry.
//
// All registry mutation flows through this task's event channel, so each
// event is processed to completion before the next one. Membership changes
// broadcast a full snapshot; movement and rotation broadcast targeted deltas
// that skip the origin.

use crate::domain::physics::{self, ArenaBounds, GravityConfig};
use crate::use_cases::moderation;
use crate::use_cases::registry::PlayerRegistry;
use crate::use_cases::types::{ArenaEvent, OutboundEvent};
use shared::{Vec3, validate_name};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Tuning for a spawned arena task.
#[derive(Debug, Clone)]
pub struct ArenaSettings {
    pub bounds: ArenaBounds,
    pub spawn_point: Vec3,
    pub admin_names: HashSet<String>,
    pub gravity: GravityConfig,
    /// Fixed interval for the server-side physics tick.
    pub tick_interval: Duration,
}

pub async fn arena_task(
    mut event_rx: mpsc::Receiver<ArenaEvent>,
    outbound_tx: mpsc::UnboundedSender<OutboundEvent>,
    settings: ArenaSettings,
    shutdown: Arc<tokio::sync::Notify>,
) {
    let mut registry = PlayerRegistry::new(
        settings.bounds,
        settings.spawn_point,
        settings.admin_names.clone(),
    );
    let mut interval = tokio::time::interval(settings.tick_interval);
    let dt = settings.tick_interval.as_secs_f32();

    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            event = event_rx.recv() => {
                match event {
                    Some(event) => handle_event(&mut registry, &outbound_tx, event),
                    // All connection handles dropped; nothing left to serve.
                    None => break,
                }
            }
            _ = interval.tick() => {
                gravity_step(&mut registry, &outbound_tx, dt, settings.gravity);
            }
        }
    }

    info!(players = registry.len(), "arena task stopped");
}

/// Applies one event to the registry and emits the matching outbound traffic.
///
/// The outbound channel is unbounded: membership snapshots and kick notices
/// are structural and must never be dropped before serialization.
pub fn handle_event(
    registry: &mut PlayerRegistry,
    outbound_tx: &mpsc::UnboundedSender<OutboundEvent>,
    event: ArenaEvent,
) {
    match event {
        ArenaEvent::Join {
            player_id,
            name,
            class,
        } => {
            // The connection layer validates names before forwarding, but the
            // registry is the authority; re-check so no other path can slip
            // an invalid name into a record.
            let name = match validate_name(&name) {
                Ok(name) => name,
                Err(reason) => {
                    warn!(player_id, %reason, "join rejected");
                    return;
                }
            };

            if registry.register(player_id, name.clone(), class) {
                info!(player_id, name = %name, ?class, "player joined");
                broadcast_snapshot(registry, outbound_tx);
            }
        }
        ArenaEvent::Leave { player_id } => {
            // Idempotent: a disconnect racing a kick unregisters once.
            if registry.unregister(player_id) {
                info!(player_id, "player left");
                broadcast_snapshot(registry, outbound_tx);
            }
        }
        ArenaEvent::Move {
            player_id,
            position,
        } => {
            if registry.set_position(player_id, position) {
                // Read back the clamped value so clients never see an
                // out-of-bounds position.
                if let Some(record) = registry.get(player_id) {
                    let _ = outbound_tx.send(OutboundEvent::PositionDelta {
                        origin: player_id,
                        position: record.position,
                    });
                }
            }
        }
        ArenaEvent::Rotate {
            player_id,
            rotation,
        } => {
            if registry.set_rotation(player_id, rotation) {
                let _ = outbound_tx.send(OutboundEvent::RotationDelta {
                    origin: player_id,
                    rotation,
                });
            }
        }
        ArenaEvent::Chat { player_id, message } => {
            // Only registered players can speak; the sender name comes from
            // the registry, never from the wire.
            let Some(record) = registry.get(player_id) else {
                debug!(player_id, "chat from unknown player dropped");
                return;
            };
            let _ = outbound_tx.send(OutboundEvent::Chat {
                sender: record.name.clone(),
                message,
                timestamp: now_epoch_ms(),
            });
        }
        ArenaEvent::Kick { requester, target } => {
            match moderation::validate_kick(registry, requester, target) {
                Ok(target) => {
                    info!(requester, target, "kick executed");
                    // Notify first: the kick notice must reach the target's
                    // connection before the membership snapshot closes it out.
                    let _ = outbound_tx.send(OutboundEvent::Kick { target });
                    if registry.unregister(target) {
                        broadcast_snapshot(registry, outbound_tx);
                    }
                }
                Err(reason) => {
                    // Silent for the requester; nothing is broadcast and no
                    // error is leaked back.
                    debug!(requester, target, ?reason, "kick rejected");
                }
            }
        }
    }
}

/// Integrates gravity for airborne players and emits deltas for the movers.
fn gravity_step(
    registry: &mut PlayerRegistry,
    outbound_tx: &mpsc::UnboundedSender<OutboundEvent>,
    dt: f32,
    gravity: GravityConfig,
) {
    let bounds = registry.bounds();
    let mut moved: Vec<(u64, Vec3)> = Vec::new();

    for record in registry.iter_mut() {
        if physics::apply_gravity(record, dt, gravity, bounds) {
            moved.push((record.id, record.position));
        }
    }

    for (origin, position) in moved {
        let _ = outbound_tx.send(OutboundEvent::PositionDelta { origin, position });
    }
}

fn broadcast_snapshot(
    registry: &PlayerRegistry,
    outbound_tx: &mpsc::UnboundedSender<OutboundEvent>,
) {
    let _ = outbound_tx.send(OutboundEvent::Snapshot(registry.list()));
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
