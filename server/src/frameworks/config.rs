use crate::domain::physics::{ArenaBounds, GravityConfig};
use shared::Vec3;
use std::{collections::HashSet, env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const WIRE_BROADCAST_CAPACITY: usize = 256;

// Server-side physics tick; deltas caused by gravity ride the normal
// broadcast path.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

pub fn http_port() -> u16 {
    env::var("ARENA_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

/// Arena volume every position update is clamped into.
pub fn arena_bounds() -> ArenaBounds {
    let horizontal = env_f32("ARENA_HORIZONTAL_BOUND", 10.0);
    let floor_y = env_f32("ARENA_FLOOR_Y", -2.0);
    let ceiling_y = env_f32("ARENA_CEILING_Y", 5.0);
    ArenaBounds {
        horizontal,
        floor_y,
        ceiling_y,
    }
}

pub fn gravity() -> GravityConfig {
    GravityConfig {
        acceleration: env_f32("ARENA_GRAVITY", 9.8),
    }
}

/// Fixed spawn point for newly registered players (on the arena floor).
pub fn spawn_point() -> Vec3 {
    Vec3::new(0.0, arena_bounds().floor_y, 0.0)
}

/// Display names granted the admin role at registration time.
///
/// Name-based trust only; this is not a security boundary.
pub fn admin_names() -> HashSet<String> {
    env::var("ARENA_ADMIN_NAMES")
        .unwrap_or_else(|_| "swami".to_string())
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn env_f32(key: &str, default: f32) -> f32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
