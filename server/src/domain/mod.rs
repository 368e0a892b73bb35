// Domain layer: player records and arena rules.

pub mod physics;
pub mod state;

pub use state::{PlayerId, PlayerRecord, PlayerSnapshot, Role};
