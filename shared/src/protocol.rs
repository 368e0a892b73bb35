// Wire protocol DTOs for the arena WebSocket connection.
// Messages are JSON text frames tagged `{"type": ..., "data": ...}` so
// browser clients can dispatch on the `type` field directly.

use serde::{Deserialize, Serialize};

/// A position in the arena. Y is vertical; the floor sits at a negative Y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Closed set of playable archetypes, chosen once at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Warrior,
    Mage,
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    // One-time registration for the session; name and class are immutable after this.
    SelectCharacter { name: String, class: CharacterClass },
    // Movement update for the sender's own avatar. Droppable; each supersedes the last.
    Move { x: f32, y: f32, z: f32 },
    // Yaw update for the sender's own avatar. Droppable; each supersedes the last.
    Rotate { angle: f32 },
    // Chat line relayed to all players with the sender's name and a server timestamp.
    ChatMessage { message: String },
    // Moderation request; silently ignored unless the sender holds the admin role.
    KickPlayer { target_id: String },
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    // Assigned identity for the connection, sent before any snapshot so the
    // client can tell its own record apart from remote ones.
    Identity { player_id: String },
    // Full authoritative player list; clients reconcile their mirror against it.
    Players(Vec<PlayerDto>),
    // Targeted position delta for one player. Never echoed to the origin.
    PlayerMoved { id: String, position: Vec3 },
    // Targeted rotation delta for one player. Never echoed to the origin.
    PlayerRotated { id: String, rotation: f32 },
    // Relayed chat line; timestamp is server epoch milliseconds.
    ChatMessage {
        sender: String,
        message: String,
        timestamp: u64,
    },
    // The receiving connection has been kicked and will be closed.
    Kicked,
}

/// Flattened player record for wire transmission.
///
/// Ids travel as strings so web clients never touch 64-bit integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub class: CharacterClass,
    pub position: Vec3,
    pub rotation: f32,
}
