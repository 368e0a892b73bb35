mod support;

use shared::CharacterClass;

#[tokio::test]
async fn disconnect_removes_the_player_from_the_next_snapshot() {
    let base_url = support::ensure_server();

    let (mut cal, cal_id) = support::connect(base_url).await;
    support::join(&mut cal, "Cal", CharacterClass::Warrior).await;
    support::wait_for_snapshot(&mut cal, |p| p.iter().any(|r| r.id == cal_id)).await;

    let (mut dee, _dee_id) = support::connect(base_url).await;
    support::join(&mut dee, "Dee", CharacterClass::Mage).await;
    support::wait_for_snapshot(&mut dee, |p| p.iter().any(|r| r.id == cal_id)).await;

    drop(cal);

    // Dee sees a snapshot without Cal once the disconnect is processed.
    support::wait_for_snapshot(&mut dee, |p| p.iter().all(|r| r.id != cal_id)).await;
}
