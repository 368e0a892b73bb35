// Wire protocol and validation rules shared by the arena server and client.

pub mod protocol;
pub mod validate;

pub use protocol::{CharacterClass, ClientMessage, PlayerDto, ServerMessage, Vec3};
pub use validate::{MAX_NAME_LEN, MIN_NAME_LEN, NameError, validate_name};
