// Connection registry: the canonical list of connected players.
//
// Owned by the arena task, so no locking is needed; every mutation enters
// through the explicit operations below. Insertion order is preserved so
// broadcast snapshots are stable across clients.

use crate::domain::physics::ArenaBounds;
use crate::domain::{PlayerId, PlayerRecord, PlayerSnapshot, Role};
use shared::{CharacterClass, Vec3};
use std::collections::HashSet;
use tracing::debug;

pub struct PlayerRegistry {
    players: Vec<PlayerRecord>,
    bounds: ArenaBounds,
    spawn_point: Vec3,
    admin_names: HashSet<String>,
}

impl PlayerRegistry {
    pub fn new(bounds: ArenaBounds, spawn_point: Vec3, admin_names: HashSet<String>) -> Self {
        Self {
            players: Vec::new(),
            bounds,
            spawn_point,
            admin_names,
        }
    }

    /// Creates a record at the spawn point with rotation 0.
    ///
    /// The admin role is granted at registration time from the configured
    /// admin-name list; the client never asserts a role directly. Registering
    /// an already-known id is a no-op.
    pub fn register(&mut self, id: PlayerId, name: String, class: CharacterClass) -> bool {
        if self.contains(id) {
            debug!(player_id = id, "duplicate register ignored");
            return false;
        }

        let role = if self.admin_names.contains(&name) {
            Role::Admin
        } else {
            Role::Player
        };

        self.players.push(PlayerRecord {
            id,
            name,
            class,
            role,
            position: self.spawn_point,
            rotation: 0.0,
            fall_velocity: 0.0,
        });
        true
    }

    /// Removes a record. Idempotent; removing an unknown id is a no-op.
    pub fn unregister(&mut self, id: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != before
    }

    /// Mutates a record's position, clamped to the arena bounds.
    ///
    /// A late update for a disconnected id is dropped; it must never
    /// resurrect a record.
    pub fn set_position(&mut self, id: PlayerId, position: Vec3) -> bool {
        let clamped = self.bounds.clamp(position);
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(record) => {
                record.position = clamped;
                true
            }
            None => {
                debug!(player_id = id, "position update for unknown player dropped");
                false
            }
        }
    }

    /// Mutates a record's yaw. Same liveness rules as `set_position`.
    pub fn set_rotation(&mut self, id: PlayerId, rotation: f32) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(record) => {
                record.rotation = rotation;
                true
            }
            None => {
                debug!(player_id = id, "rotation update for unknown player dropped");
                false
            }
        }
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerRecord> {
        self.players.iter_mut()
    }

    /// Stable insertion-order snapshot for broadcast.
    pub fn list(&self) -> Vec<PlayerSnapshot> {
        self.players.iter().map(PlayerSnapshot::from).collect()
    }

    pub fn bounds(&self) -> ArenaBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PlayerRegistry {
        let bounds = ArenaBounds {
            horizontal: 10.0,
            floor_y: -2.0,
            ceiling_y: 5.0,
        };
        let admins = HashSet::from(["swami".to_string()]);
        PlayerRegistry::new(bounds, Vec3::new(0.0, -2.0, 0.0), admins)
    }

    #[test]
    fn register_creates_record_at_spawn_with_zero_rotation() {
        let mut reg = registry();
        assert!(reg.register(1, "Ari".to_string(), CharacterClass::Warrior));

        let record = reg.get(1).unwrap();
        assert_eq!(record.position, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(record.rotation, 0.0);
        assert_eq!(record.role, Role::Player);
    }

    #[test]
    fn register_twice_for_the_same_id_is_a_no_op() {
        let mut reg = registry();
        assert!(reg.register(1, "Ari".to_string(), CharacterClass::Warrior));
        assert!(!reg.register(1, "Bea".to_string(), CharacterClass::Mage));

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(1).unwrap().name, "Ari");
    }

    #[test]
    fn admin_role_comes_from_the_configured_name_list() {
        let mut reg = registry();
        reg.register(1, "swami".to_string(), CharacterClass::Mage);
        reg.register(2, "Ari".to_string(), CharacterClass::Warrior);

        assert!(reg.get(1).unwrap().is_admin());
        assert!(!reg.get(2).unwrap().is_admin());
    }

    #[test]
    fn list_matches_the_connected_set_in_insertion_order() {
        let mut reg = registry();
        reg.register(3, "Ari".to_string(), CharacterClass::Warrior);
        reg.register(1, "Bea".to_string(), CharacterClass::Mage);
        reg.register(2, "Cal".to_string(), CharacterClass::Warrior);
        reg.unregister(1);

        let ids: Vec<_> = reg.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut reg = registry();
        reg.register(1, "Ari".to_string(), CharacterClass::Warrior);

        assert!(reg.unregister(1));
        assert!(!reg.unregister(1));
        assert!(reg.is_empty());
    }

    #[test]
    fn updates_for_unknown_ids_never_resurrect_a_record() {
        let mut reg = registry();
        reg.register(1, "Ari".to_string(), CharacterClass::Warrior);
        reg.unregister(1);

        assert!(!reg.set_position(1, Vec3::new(1.0, 0.0, 0.0)));
        assert!(!reg.set_rotation(1, 1.5));
        assert!(reg.is_empty());
    }

    #[test]
    fn set_position_clamps_to_arena_bounds() {
        let mut reg = registry();
        reg.register(1, "Ari".to_string(), CharacterClass::Warrior);

        assert!(reg.set_position(1, Vec3::new(50.0, 50.0, -50.0)));
        assert_eq!(reg.get(1).unwrap().position, Vec3::new(10.0, 5.0, -10.0));
    }

    #[test]
    fn set_rotation_updates_in_place() {
        let mut reg = registry();
        reg.register(1, "Ari".to_string(), CharacterClass::Warrior);

        assert!(reg.set_rotation(1, -3.0));
        assert_eq!(reg.get(1).unwrap().rotation, -3.0);
    }
}
