// Client-side mirror of the server's player registry.
//
// The mirror only ever holds remote players; the local player's record is
// driven by local input, not interpolation, so it is excluded here and
// reported back to the caller instead.

use shared::{CharacterClass, PlayerDto, Vec3};
use std::collections::HashMap;
use tracing::debug;

/// One remote player as the client tracks it between network updates.
///
/// `position`/`rotation` are the rendered values; `target_*` is the latest
/// state received from the network. The interpolation engine moves rendered
/// values toward their targets over time.
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub name: String,
    pub class: CharacterClass,
    pub position: Vec3,
    pub rotation: f32,
    pub target_position: Vec3,
    pub target_rotation: f32,
    pub last_position_update_ms: u64,
    pub last_rotation_update_ms: u64,
}

impl RemotePlayer {
    fn from_dto(dto: &PlayerDto, now_ms: u64) -> Self {
        // First appearance: rendered state starts equal to the target, so a
        // new player never lerps in from somewhere it has never been.
        Self {
            name: dto.name.clone(),
            class: dto.class,
            position: dto.position,
            rotation: dto.rotation,
            target_position: dto.position,
            target_rotation: dto.rotation,
            last_position_update_ms: now_ms,
            last_rotation_update_ms: now_ms,
        }
    }
}

/// Result of reconciling a snapshot, for scene management by the caller.
#[derive(Debug, Default)]
pub struct SnapshotOutcome {
    /// The local player's record if it appeared in the snapshot.
    pub local: Option<PlayerDto>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

pub struct Mirror {
    local_id: String,
    players: HashMap<String, RemotePlayer>,
}

impl Mirror {
    pub fn new(local_id: String) -> Self {
        Self {
            local_id,
            players: HashMap::new(),
        }
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RemotePlayer> {
        self.players.get(id)
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut RemotePlayer> {
        self.players.values_mut()
    }

    /// Reconciles the mirror against an authoritative player list.
    ///
    /// Unknown records are created, records absent from the list are removed,
    /// and surviving records get fresh targets while their rendered state is
    /// left for the interpolation engine to catch up.
    pub fn apply_snapshot(&mut self, records: &[PlayerDto], now_ms: u64) -> SnapshotOutcome {
        let mut outcome = SnapshotOutcome::default();

        for dto in records {
            if dto.id == self.local_id {
                outcome.local = Some(dto.clone());
                continue;
            }

            match self.players.get_mut(&dto.id) {
                Some(existing) => {
                    existing.target_position = dto.position;
                    existing.target_rotation = dto.rotation;
                    existing.last_position_update_ms = now_ms;
                    existing.last_rotation_update_ms = now_ms;
                }
                None => {
                    self.players
                        .insert(dto.id.clone(), RemotePlayer::from_dto(dto, now_ms));
                    outcome.added.push(dto.id.clone());
                }
            }
        }

        // Anything the server no longer lists is gone.
        let stale: Vec<String> = self
            .players
            .keys()
            .filter(|id| !records.iter().any(|dto| &dto.id == *id))
            .cloned()
            .collect();
        for id in stale {
            self.players.remove(&id);
            outcome.removed.push(id);
        }

        outcome
    }

    /// Updates one player's target position. Deltas for unknown ids or for
    /// the local player are silently ignored; the local avatar is never
    /// interpolated from network echoes.
    pub fn apply_position_delta(&mut self, id: &str, position: Vec3, now_ms: u64) {
        if id == self.local_id {
            return;
        }
        match self.players.get_mut(id) {
            Some(player) => {
                player.target_position = position;
                player.last_position_update_ms = now_ms;
            }
            None => debug!(id, "position delta for unknown player ignored"),
        }
    }

    /// Updates one player's target rotation, same rules as position deltas.
    pub fn apply_rotation_delta(&mut self, id: &str, rotation: f32, now_ms: u64) {
        if id == self.local_id {
            return;
        }
        match self.players.get_mut(id) {
            Some(player) => {
                player.target_rotation = rotation;
                player.last_rotation_update_ms = now_ms;
            }
            None => debug!(id, "rotation delta for unknown player ignored"),
        }
    }
}
