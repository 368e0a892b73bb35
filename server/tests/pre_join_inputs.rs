mod support;

use shared::{CharacterClass, ClientMessage};
use std::time::Duration;

#[tokio::test]
async fn inputs_before_character_selection_produce_no_traffic() {
    let base_url = support::ensure_server();

    let (mut ida, ida_id) = support::connect(base_url).await;
    support::join(&mut ida, "Ida", CharacterClass::Warrior).await;
    support::wait_for_snapshot(&mut ida, |p| p.iter().any(|r| r.id == ida_id)).await;

    // A connection that never selected a character sends every gameplay
    // input, including a kick aimed at a registered player.
    let (mut lurker, _lurker_id) = support::connect(base_url).await;
    support::send(
        &mut lurker,
        &ClientMessage::Move {
            x: 1.0,
            y: -2.0,
            z: 0.0,
        },
    )
    .await;
    support::send(&mut lurker, &ClientMessage::Rotate { angle: 1.0 }).await;
    support::send(
        &mut lurker,
        &ClientMessage::ChatMessage {
            message: "hello".to_string(),
        },
    )
    .await;
    support::send(
        &mut lurker,
        &ClientMessage::KickPlayer {
            target_id: ida_id.clone(),
        },
    )
    .await;

    // None of it becomes arena traffic; the registered player stays
    // connected and hears nothing.
    support::expect_silence(&mut ida, Duration::from_millis(500)).await;
}
