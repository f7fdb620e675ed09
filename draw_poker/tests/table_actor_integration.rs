//! Integration tests for the table actors and the registry: message
//! round-trips, listing, shutdown, and the turn-timeout auto-fold.

use draw_poker::game::{GameError, Phase, PlayerAction};
use draw_poker::table::{TableConfig, TableRegistry};
use tokio::time::{Duration, sleep};

fn config(name: &str) -> TableConfig {
    TableConfig {
        name: name.to_string(),
        ..TableConfig::default()
    }
}

#[tokio::test]
async fn registry_creates_lists_and_closes_tables() {
    let registry = TableRegistry::new();
    let first = registry.create(config("First")).await.unwrap();
    let second = registry.create(config("Second")).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(registry.table_count().await, 2);

    let listing = registry.list().await;
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].id, first);
    assert_eq!(listing[0].name, "First");
    assert_eq!(listing[0].player_count, 0);
    assert_eq!(listing[0].phase, Phase::Waiting);

    assert!(registry.close(first).await);
    assert!(!registry.close(first).await);
    assert_eq!(registry.table_count().await, 1);
    assert!(registry.get(first).await.is_none());
    assert!(registry.get(second).await.is_some());
}

#[tokio::test]
async fn rejects_invalid_configs() {
    let registry = TableRegistry::new();
    let mut bad = config("");
    assert!(registry.create(bad.clone()).await.is_err());
    bad.name = "Ok".to_string();
    bad.max_players = 0;
    assert!(registry.create(bad).await.is_err());
}

#[tokio::test]
async fn plays_a_full_hand_through_the_actor() {
    let registry = TableRegistry::new();
    let id = registry.create(config("Game")).await.unwrap();
    let handle = registry.get(id).await.unwrap();

    let snap = handle
        .join("p1".to_string(), "alice".to_string(), None)
        .await
        .unwrap();
    assert_eq!(snap.players.len(), 1);
    handle
        .join("p2".to_string(), "bob".to_string(), Some(200))
        .await
        .unwrap();

    let snap = handle.open_bet("p1".to_string(), 10).await.unwrap();
    assert_eq!(snap.phase, Phase::Betting1);
    assert_eq!(snap.pot, 10);
    // The opener's reply carries their own hand.
    assert_eq!(snap.hand.as_ref().map(Vec::len), Some(5));

    handle
        .take_action("p2".to_string(), PlayerAction::Call)
        .await
        .unwrap();
    handle.draw("p1".to_string(), vec![0, 1, 2, 3, 4]).await.unwrap();
    handle.draw("p2".to_string(), vec![0, 1]).await.unwrap();
    handle
        .take_action("p1".to_string(), PlayerAction::Check)
        .await
        .unwrap();
    let snap = handle
        .take_action("p2".to_string(), PlayerAction::Check)
        .await
        .unwrap();

    assert_eq!(snap.phase, Phase::Waiting);
    let summary = snap.last_showdown.expect("showdown summary");
    assert_eq!(summary.pot, 20);
    assert_eq!(summary.winners.iter().map(|w| w.amount).sum::<u32>(), 20);

    let metadata = handle.metadata().await.unwrap();
    assert_eq!(metadata.hand_count, 1);
    assert_eq!(metadata.player_count, 2);
}

#[tokio::test]
async fn seating_errors_surface_through_the_handle() {
    let registry = TableRegistry::new();
    let id = registry
        .create(TableConfig {
            name: "Tiny".to_string(),
            max_players: 2,
            ..TableConfig::default()
        })
        .await
        .unwrap();
    let handle = registry.get(id).await.unwrap();

    handle
        .join("p1".to_string(), "alice".to_string(), None)
        .await
        .unwrap();
    assert_eq!(
        handle
            .join("p1".to_string(), "alice again".to_string(), None)
            .await
            .unwrap_err(),
        GameError::AlreadySeated
    );
    handle
        .join("p2".to_string(), "bob".to_string(), None)
        .await
        .unwrap();
    assert_eq!(
        handle
            .join("p3".to_string(), "carol".to_string(), None)
            .await
            .unwrap_err(),
        GameError::TableFull
    );
    assert_eq!(
        handle.leave("ghost".to_string()).await.unwrap_err(),
        GameError::UnknownPlayer
    );
}

#[tokio::test]
async fn spectator_state_hides_all_hands() {
    let registry = TableRegistry::new();
    let id = registry.create(config("Peek")).await.unwrap();
    let handle = registry.get(id).await.unwrap();
    handle
        .join("p1".to_string(), "alice".to_string(), None)
        .await
        .unwrap();
    handle
        .join("p2".to_string(), "bob".to_string(), None)
        .await
        .unwrap();
    handle.open_bet("p1".to_string(), 10).await.unwrap();

    let snap = handle.state(None).await.unwrap();
    assert!(snap.players.iter().all(|p| p.hand.is_none()));
    assert!(snap.hand.is_none());

    let snap = handle.state(Some("p2".to_string())).await.unwrap();
    assert_eq!(snap.hand.map(|h| h.len()), Some(5));
}

#[tokio::test(start_paused = true)]
async fn turn_timeout_auto_folds_the_stalled_player() {
    let registry = TableRegistry::new();
    let id = registry
        .create(TableConfig {
            name: "Impatient".to_string(),
            turn_timeout_secs: 2,
            ..TableConfig::default()
        })
        .await
        .unwrap();
    let handle = registry.get(id).await.unwrap();

    handle
        .join("p1".to_string(), "alice".to_string(), None)
        .await
        .unwrap();
    handle
        .join("p2".to_string(), "bob".to_string(), None)
        .await
        .unwrap();
    let snap = handle.open_bet("p1".to_string(), 10).await.unwrap();
    assert_eq!(snap.active_player_id.as_deref(), Some("p2"));

    // Paused time: the sleep advances the clock and the actor's ticker
    // catches up, folding the stalled player.
    sleep(Duration::from_secs(5)).await;

    let snap = handle.state(Some("p1".to_string())).await.unwrap();
    assert_eq!(snap.phase, Phase::Waiting);
    let summary = snap.last_showdown.expect("auto-fold award");
    assert_eq!(summary.winners[0].player_id, "p1");
    let bob = snap.players.iter().find(|p| p.id == "p2").unwrap();
    assert_eq!(
        serde_json::to_value(&bob.last_action).unwrap(),
        "folds (timed out)"
    );
}

#[tokio::test]
async fn timeout_disabled_leaves_the_turn_alone() {
    let registry = TableRegistry::new();
    let id = registry
        .create(TableConfig {
            name: "Patient".to_string(),
            turn_timeout_secs: 0,
            ..TableConfig::default()
        })
        .await
        .unwrap();
    let handle = registry.get(id).await.unwrap();
    handle
        .join("p1".to_string(), "alice".to_string(), None)
        .await
        .unwrap();
    handle
        .join("p2".to_string(), "bob".to_string(), None)
        .await
        .unwrap();
    handle.open_bet("p1".to_string(), 10).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1200)).await;
    let snap = handle.state(None).await.unwrap();
    assert_eq!(snap.phase, Phase::Betting1);
    assert_eq!(snap.active_player_id.as_deref(), Some("p2"));
}

#[tokio::test]
async fn closed_tables_report_table_closed() {
    let registry = TableRegistry::new();
    let id = registry.create(config("Gone")).await.unwrap();
    let handle = registry.get(id).await.unwrap();
    assert!(registry.close(id).await);

    // Give the actor a moment to drain its inbox and stop.
    tokio::task::yield_now().await;
    let result = handle
        .join("p1".to_string(), "alice".to_string(), None)
        .await;
    assert_eq!(result.unwrap_err(), GameError::TableClosed);
}
