// Player records owned by the arena task, plus the snapshot form that gets
// broadcast to clients.

use shared::{CharacterClass, Vec3};

/// Opaque per-connection identifier. Assigned at connection time, stable
/// until disconnect, never reused while the connection lives.
pub type PlayerId = u64;

/// Authorization level attached to a record at registration time.
///
/// Derived server-side from configuration, never taken from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player,
    Admin,
}

/// Authoritative per-connection player state.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub class: CharacterClass,
    pub role: Role,
    pub position: Vec3,
    // Yaw in radians. Conceptually [-pi, pi] but not strictly clamped.
    pub rotation: f32,

    // Server-only gravity state (not serialized to clients).
    pub fall_velocity: f32,
}

impl PlayerRecord {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Immutable view of a record used for broadcast snapshots.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub class: CharacterClass,
    pub position: Vec3,
    pub rotation: f32,
}

impl From<&PlayerRecord> for PlayerSnapshot {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            class: record.class,
            position: record.position,
            rotation: record.rotation,
        }
    }
}
