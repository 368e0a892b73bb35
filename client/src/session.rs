// Session state machine: folds server messages into the mirror and tracks
// the local player's lifecycle.
//
// The session owns no sockets and reads no clocks; the caller feeds it
// messages and timestamps, which keeps the whole protocol path testable.

use crate::mirror::Mirror;
use shared::{CharacterClass, ClientMessage, NameError, PlayerDto, ServerMessage, validate_name};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum SessionError {
    /// The display name failed validation at the client boundary; nothing
    /// was sent to the server.
    InvalidName(NameError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidName(reason) => write!(f, "invalid display name: {reason}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// What the caller should do after feeding a message to the session.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    /// The server kicked this session; the connection is about to close and
    /// the identity is gone. A fresh session means a fresh registration.
    Kicked,
}

/// A chat line ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub sender: String,
    pub message: String,
    pub timestamp: u64,
}

pub struct Session {
    name: String,
    class: CharacterClass,
    mirror: Option<Mirror>,
    local_spawned: bool,
    chat_log: Vec<ChatLine>,
}

impl Session {
    /// Validates the display name up front; a bad name never produces a
    /// registration message.
    pub fn new(name: &str, class: CharacterClass) -> Result<Session, SessionError> {
        let name = validate_name(name).map_err(SessionError::InvalidName)?;
        Ok(Session {
            name,
            class,
            mirror: None,
            local_spawned: false,
            chat_log: Vec::new(),
        })
    }

    /// The one-time registration message for this session.
    pub fn select_character(&self) -> ClientMessage {
        ClientMessage::SelectCharacter {
            name: self.name.clone(),
            class: self.class,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mirror(&self) -> Option<&Mirror> {
        self.mirror.as_ref()
    }

    pub fn mirror_mut(&mut self) -> Option<&mut Mirror> {
        self.mirror.as_mut()
    }

    pub fn local_spawned(&self) -> bool {
        self.local_spawned
    }

    pub fn chat_log(&self) -> &[ChatLine] {
        &self.chat_log
    }

    /// Folds one server message into the session state.
    pub fn handle_message(&mut self, message: ServerMessage, now_ms: u64) -> SessionStatus {
        match message {
            ServerMessage::Identity { player_id } => {
                info!(%player_id, "identity assigned");
                self.mirror = Some(Mirror::new(player_id));
            }
            ServerMessage::Players(records) => {
                let Some(mirror) = self.mirror.as_mut() else {
                    warn!("snapshot before identity; dropped");
                    return SessionStatus::Active;
                };
                let outcome = mirror.apply_snapshot(&records, now_ms);
                let remote_players = mirror.len();
                if let Some(local) = outcome.local {
                    self.on_local_record(&local);
                }
                if !outcome.added.is_empty() || !outcome.removed.is_empty() {
                    debug!(
                        added = outcome.added.len(),
                        removed = outcome.removed.len(),
                        remote_players,
                        "mirror reconciled"
                    );
                }
            }
            ServerMessage::PlayerMoved { id, position } => {
                if let Some(mirror) = self.mirror.as_mut() {
                    mirror.apply_position_delta(&id, position, now_ms);
                }
            }
            ServerMessage::PlayerRotated { id, rotation } => {
                if let Some(mirror) = self.mirror.as_mut() {
                    mirror.apply_rotation_delta(&id, rotation, now_ms);
                }
            }
            ServerMessage::ChatMessage {
                sender,
                message,
                timestamp,
            } => {
                self.chat_log.push(ChatLine {
                    sender,
                    message,
                    timestamp,
                });
            }
            ServerMessage::Kicked => {
                warn!("kicked by the server");
                return SessionStatus::Kicked;
            }
        }
        SessionStatus::Active
    }

    fn on_local_record(&mut self, record: &PlayerDto) {
        // The local avatar is created exactly once, the first time the
        // server's snapshot confirms our registration.
        if !self.local_spawned {
            self.local_spawned = true;
            info!(
                name = %record.name,
                class = ?record.class,
                "local player confirmed by server"
            );
        }
    }
}
