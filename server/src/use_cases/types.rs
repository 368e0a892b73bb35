// Use-case level inputs/outputs for the arena task.

use crate::domain::{PlayerId, PlayerSnapshot};
use shared::{CharacterClass, Vec3};

/// Events flowing from connection handlers into the arena task.
#[derive(Debug, Clone)]
pub enum ArenaEvent {
    Join {
        player_id: PlayerId,
        name: String,
        class: CharacterClass,
    },
    Leave {
        player_id: PlayerId,
    },
    Move {
        player_id: PlayerId,
        position: Vec3,
    },
    Rotate {
        player_id: PlayerId,
        rotation: f32,
    },
    Chat {
        player_id: PlayerId,
        message: String,
    },
    Kick {
        requester: PlayerId,
        target: PlayerId,
    },
}

/// Events flowing from the arena task out toward connections.
///
/// Snapshots are structural and reach every client (including the origin, so
/// each client can identify its own record). Deltas are high-frequency and
/// skip the origin, which already holds authoritative local state.
#[derive(Debug, Clone)]
pub enum OutboundEvent {
    Snapshot(Vec<PlayerSnapshot>),
    PositionDelta { origin: PlayerId, position: Vec3 },
    RotationDelta { origin: PlayerId, rotation: f32 },
    Chat {
        sender: String,
        message: String,
        timestamp: u64,
    },
    Kick { target: PlayerId },
}
