// Interpolation engine: moves rendered state toward network targets.
//
// Runs once per render tick for every mirrored player. Time arrives as an
// explicit parameter so ticks can be replayed deterministically in tests.

use crate::mirror::{Mirror, RemotePlayer};
use std::f32::consts::PI;

/// Expected interval between position updates from the server.
pub const POSITION_WINDOW_MS: u64 = 100;
/// Rotation window is tighter; laggy turning reads worse than laggy motion.
pub const ROTATION_WINDOW_MS: u64 = 50;
/// Extra gain applied to rotation so turns finish crisply inside the window.
pub const ROTATION_GAIN: f32 = 1.5;

/// Advances every mirrored player's rendered state toward its target.
pub fn advance(mirror: &mut Mirror, now_ms: u64) {
    for player in mirror.players_mut() {
        advance_player(player, now_ms);
    }
}

fn advance_player(player: &mut RemotePlayer, now_ms: u64) {
    // Exponential approach: each tick covers fraction `t` of the remaining
    // distance, so motion stays smooth across uneven tick and packet timing.
    let t = progress(now_ms, player.last_position_update_ms, POSITION_WINDOW_MS);
    player.position.x += (player.target_position.x - player.position.x) * t;
    player.position.y += (player.target_position.y - player.position.y) * t;
    player.position.z += (player.target_position.z - player.position.z) * t;

    let t = progress(now_ms, player.last_rotation_update_ms, ROTATION_WINDOW_MS);
    let target = shortest_path_target(player.rotation, player.target_rotation);
    player.rotation += (target - player.rotation) * (t * ROTATION_GAIN).min(1.0);
}

fn progress(now_ms: u64, last_update_ms: u64, window_ms: u64) -> f32 {
    let elapsed = now_ms.saturating_sub(last_update_ms);
    (elapsed as f32 / window_ms as f32).clamp(0.0, 1.0)
}

/// Adjusts a target angle by +/- 2*pi so the interpolated path never travels
/// more than pi radians. Without this, crossing the -pi/pi seam spins the
/// long way around.
pub fn shortest_path_target(current: f32, target: f32) -> f32 {
    let diff = target - current;
    if diff > PI {
        target - 2.0 * PI
    } else if diff < -PI {
        target + 2.0 * PI
    } else {
        target
    }
}
