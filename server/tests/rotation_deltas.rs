mod support;

use shared::{CharacterClass, ClientMessage, ServerMessage};
use std::time::Duration;

#[tokio::test]
async fn rotation_deltas_reach_observers_but_never_echo_to_the_origin() {
    let base_url = support::ensure_server();

    let (mut eli, eli_id) = support::connect(base_url).await;
    support::join(&mut eli, "Eli", CharacterClass::Warrior).await;
    support::wait_for_snapshot(&mut eli, |p| p.len() == 1).await;

    let (mut fay, _fay_id) = support::connect(base_url).await;
    support::join(&mut fay, "Fay", CharacterClass::Mage).await;
    support::wait_for_snapshot(&mut eli, |p| p.len() == 2).await;
    support::wait_for_snapshot(&mut fay, |p| p.len() == 2).await;

    support::send(&mut eli, &ClientMessage::Rotate { angle: 1.25 }).await;

    match support::next_message(&mut fay).await {
        ServerMessage::PlayerRotated { id, rotation } => {
            assert_eq!(id, eli_id);
            assert_eq!(rotation, 1.25);
        }
        other => panic!("expected a rotation delta, got {other:?}"),
    }

    support::expect_silence(&mut eli, Duration::from_millis(500)).await;
}
