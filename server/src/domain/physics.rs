// Arena bounds validation and gravity integration.
//
// Bounds are a server-side rule applied to every position update; clients are
// never trusted to stay inside the arena on their own.

use crate::domain::PlayerRecord;
use shared::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct ArenaBounds {
    // Half-extent of the square floor; x and z are clamped to +/- this value.
    pub horizontal: f32,
    pub floor_y: f32,
    pub ceiling_y: f32,
}

impl ArenaBounds {
    /// Clamps a requested position into the arena volume.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3 {
            x: position.x.clamp(-self.horizontal, self.horizontal),
            y: position.y.clamp(self.floor_y, self.ceiling_y),
            z: position.z.clamp(-self.horizontal, self.horizontal),
        }
    }

    pub fn is_on_floor(&self, position: Vec3) -> bool {
        position.y <= self.floor_y
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GravityConfig {
    // Downward acceleration in units per second squared.
    pub acceleration: f32,
}

/// Integrates one gravity step for a record above the floor.
///
/// Returns true when the record moved, so the caller can emit a position
/// delta only for players actually affected.
pub fn apply_gravity(
    record: &mut PlayerRecord,
    dt: f32,
    gravity: GravityConfig,
    bounds: ArenaBounds,
) -> bool {
    if bounds.is_on_floor(record.position) {
        record.fall_velocity = 0.0;
        return false;
    }

    record.fall_velocity -= gravity.acceleration * dt;
    let next_y = record.position.y + record.fall_velocity * dt;

    if next_y <= bounds.floor_y {
        record.position.y = bounds.floor_y;
        record.fall_velocity = 0.0;
    } else {
        record.position.y = next_y;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use shared::CharacterClass;

    fn bounds() -> ArenaBounds {
        ArenaBounds {
            horizontal: 10.0,
            floor_y: -2.0,
            ceiling_y: 5.0,
        }
    }

    fn record_at(position: Vec3) -> PlayerRecord {
        PlayerRecord {
            id: 1,
            name: "Ari".to_string(),
            class: CharacterClass::Warrior,
            role: Role::Player,
            position,
            rotation: 0.0,
            fall_velocity: 0.0,
        }
    }

    #[test]
    fn clamp_limits_every_axis() {
        let clamped = bounds().clamp(Vec3::new(25.0, 9.0, -25.0));
        assert_eq!(clamped, Vec3::new(10.0, 5.0, -10.0));
    }

    #[test]
    fn clamp_leaves_in_bounds_positions_untouched() {
        let position = Vec3::new(1.0, 0.0, -3.5);
        assert_eq!(bounds().clamp(position), position);
    }

    #[test]
    fn gravity_is_a_no_op_on_the_floor() {
        let mut record = record_at(Vec3::new(0.0, -2.0, 0.0));
        assert!(!apply_gravity(
            &mut record,
            0.05,
            GravityConfig { acceleration: 9.8 },
            bounds()
        ));
        assert_eq!(record.position.y, -2.0);
    }

    #[test]
    fn gravity_settles_an_airborne_player_onto_the_floor() {
        let mut record = record_at(Vec3::new(0.0, 0.0, 0.0));
        let gravity = GravityConfig { acceleration: 9.8 };

        let mut moved = false;
        for _ in 0..200 {
            moved |= apply_gravity(&mut record, 0.05, gravity, bounds());
        }

        assert!(moved);
        assert_eq!(record.position.y, -2.0);
        assert_eq!(record.fall_velocity, 0.0);
    }
}
