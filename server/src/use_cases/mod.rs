// Use cases layer: application workflows for the arena server.

pub mod arena;
pub mod moderation;
pub mod registry;
pub mod types;

pub use registry::PlayerRegistry;
pub use types::{ArenaEvent, OutboundEvent};
