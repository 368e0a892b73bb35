mod support;

use futures_util::SinkExt;
use shared::CharacterClass;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn repeated_invalid_json_closes_only_the_offending_connection() {
    let base_url = support::ensure_server();

    let (mut gus, gus_id) = support::connect(base_url).await;
    support::join(&mut gus, "Gus", CharacterClass::Warrior).await;
    support::wait_for_snapshot(&mut gus, |p| p.iter().any(|r| r.id == gus_id)).await;

    // A connection that keeps sending garbage gets a policy close once it
    // passes the invalid-message threshold.
    let (mut noisy, _noisy_id) = support::connect(base_url).await;
    for _ in 0..11 {
        noisy
            .send(Message::text("this is not json"))
            .await
            .expect("send garbage frame");
    }
    support::expect_closed(&mut noisy).await;

    // Other connections are untouched: a fresh client can still register and
    // the first client still receives the resulting snapshot.
    let (mut hana, hana_id) = support::connect(base_url).await;
    support::join(&mut hana, "Hana", CharacterClass::Mage).await;
    support::wait_for_snapshot(&mut gus, |p| p.iter().any(|r| r.id == hana_id)).await;
}
