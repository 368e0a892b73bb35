// Conversion from arena outbound events to serialized wire frames.
//
// Each event is serialized exactly once; connections share the resulting
// bytes and only decide whether the frame applies to them.

use crate::domain::{PlayerId, PlayerSnapshot};
use crate::use_cases::OutboundEvent;
use axum::extract::ws::Utf8Bytes;
use shared::{PlayerDto, ServerMessage};

/// Which connections a serialized frame is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Every connection, including the origin (snapshots, chat).
    All,
    /// Every connection except the origin (movement/rotation deltas).
    Except(PlayerId),
    /// Exactly one connection, which must close after sending (kick).
    KickTarget(PlayerId),
}

/// A serialized server message plus its delivery scope.
#[derive(Debug, Clone)]
pub struct WireEvent {
    pub delivery: Delivery,
    pub payload: Utf8Bytes,
}

impl WireEvent {
    /// True when this frame should be sent on the given connection.
    pub fn applies_to(&self, player_id: PlayerId) -> bool {
        match self.delivery {
            Delivery::All => true,
            Delivery::Except(origin) => origin != player_id,
            Delivery::KickTarget(target) => target == player_id,
        }
    }
}

impl From<&PlayerSnapshot> for PlayerDto {
    fn from(snapshot: &PlayerSnapshot) -> Self {
        Self {
            id: snapshot.id.to_string(),
            name: snapshot.name.clone(),
            class: snapshot.class,
            position: snapshot.position,
            rotation: snapshot.rotation,
        }
    }
}

/// Serializes one outbound event into a shareable wire frame.
pub fn encode(event: OutboundEvent) -> Result<WireEvent, serde_json::Error> {
    let (delivery, message) = match event {
        OutboundEvent::Snapshot(players) => (
            Delivery::All,
            ServerMessage::Players(players.iter().map(PlayerDto::from).collect()),
        ),
        OutboundEvent::PositionDelta { origin, position } => (
            Delivery::Except(origin),
            ServerMessage::PlayerMoved {
                id: origin.to_string(),
                position,
            },
        ),
        OutboundEvent::RotationDelta { origin, rotation } => (
            Delivery::Except(origin),
            ServerMessage::PlayerRotated {
                id: origin.to_string(),
                rotation,
            },
        ),
        OutboundEvent::Chat {
            sender,
            message,
            timestamp,
        } => (
            Delivery::All,
            ServerMessage::ChatMessage {
                sender,
                message,
                timestamp,
            },
        ),
        OutboundEvent::Kick { target } => (Delivery::KickTarget(target), ServerMessage::Kicked),
    };

    let payload = Utf8Bytes::from(serde_json::to_string(&message)?);
    Ok(WireEvent { delivery, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Vec3;

    #[test]
    fn deltas_skip_the_origin_connection() {
        let event = OutboundEvent::PositionDelta {
            origin: 5,
            position: Vec3::new(1.0, 0.0, 0.0),
        };
        let wire = encode(event).unwrap();

        assert!(!wire.applies_to(5));
        assert!(wire.applies_to(6));
    }

    #[test]
    fn snapshots_reach_every_connection() {
        let wire = encode(OutboundEvent::Snapshot(Vec::new())).unwrap();
        assert!(wire.applies_to(1));
        assert!(wire.applies_to(2));
    }

    #[test]
    fn kick_frames_reach_only_the_target() {
        let wire = encode(OutboundEvent::Kick { target: 3 }).unwrap();
        assert!(wire.applies_to(3));
        assert!(!wire.applies_to(4));
        assert_eq!(wire.delivery, Delivery::KickTarget(3));
    }
}
