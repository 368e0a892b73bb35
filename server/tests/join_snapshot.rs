mod support;

use shared::{CharacterClass, Vec3};

#[tokio::test]
async fn registration_broadcasts_snapshots_to_every_client() {
    let base_url = support::ensure_server();

    // First client registers and receives a one-player snapshot with the
    // record at the spawn default.
    let (mut ari, ari_id) = support::connect(base_url).await;
    support::join(&mut ari, "Ari", CharacterClass::Warrior).await;

    let players = support::wait_for_snapshot(&mut ari, |p| p.len() == 1).await;
    assert_eq!(players[0].id, ari_id);
    assert_eq!(players[0].name, "Ari");
    assert_eq!(players[0].class, CharacterClass::Warrior);
    assert_eq!(players[0].position, Vec3::new(0.0, -2.0, 0.0));
    assert_eq!(players[0].rotation, 0.0);

    // Second client joins; both clients converge on the same two-player
    // snapshot in the same stable order.
    let (mut bea, bea_id) = support::connect(base_url).await;
    support::join(&mut bea, "Bea", CharacterClass::Mage).await;

    let seen_by_ari = support::wait_for_snapshot(&mut ari, |p| p.len() == 2).await;
    let seen_by_bea = support::wait_for_snapshot(&mut bea, |p| p.len() == 2).await;

    let ids_ari: Vec<_> = seen_by_ari.iter().map(|p| p.id.clone()).collect();
    let ids_bea: Vec<_> = seen_by_bea.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids_ari, ids_bea);
    assert_eq!(ids_ari, vec![ari_id.clone(), bea_id.clone()]);

    // Each client can identify its own record by its connection id.
    assert!(seen_by_bea.iter().any(|p| p.id == bea_id));
}
