// Interface adapters: wire encoding and network handling.

pub mod net;
pub mod state;
pub mod utils;
pub mod wire;
