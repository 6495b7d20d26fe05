//! End-to-end roster behavior over the in-memory backend

use pawchive_model::{StrayDraft, StrayId, StrayStatus};
use pawchive_roster::{Category, FetchOutcome, RosterConfig, RosterPhase, RosterState, RosterViewModel};
use pawchive_store::{DataSource, InMemoryStore, PollingFeed, StrayMutation};
use pawchive_test_utils::{fixtures, TEST_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

async fn wait_for(
    roster: &RosterViewModel,
    predicate: impl FnMut(&RosterState) -> bool,
) -> RosterState {
    let mut rx = roster.watch();
    let result = tokio::time::timeout(TEST_TIMEOUT, rx.wait_for(predicate)).await;
    let state = result
        .expect("timed out waiting for roster state")
        .expect("roster state sender dropped")
        .clone();
    state
}

#[tokio::test]
async fn admin_edit_flow_is_reflected_in_roster() {
    let store = Arc::new(InMemoryStore::new());
    store.seed("strays", fixtures::roster());
    let roster = RosterViewModel::new(
        DataSource::from_backend(Arc::clone(&store)),
        RosterConfig::default(),
    );
    roster.mount().await.unwrap();

    let rocky = StrayId::new("2");
    let edited = StrayDraft::new("Rocky")
        .with_location("City Library")
        .with_status(StrayStatus::Available);
    store.update("strays", &rocky, &edited).await.unwrap();

    wait_for(&roster, |s| {
        s.snapshot
            .iter()
            .any(|r| r.id == rocky && r.status == StrayStatus::Available)
    })
    .await;

    let available: Vec<String> = roster
        .visible("", Category::Available)
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert!(available.contains(&"Rocky".to_string()));
    assert!(roster.visible("library", Category::UnderCare).is_empty());

    roster.teardown().await;
    assert_eq!(store.listener_count("strays"), 0);

    // Writes after teardown never reach the torn-down roster.
    let before = roster.state();
    store
        .insert("strays", &StrayDraft::new("Pepper"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(roster.state(), before);
}

#[tokio::test(start_paused = true)]
async fn polling_feed_drives_refetch() {
    let store = Arc::new(InMemoryStore::new());
    store.seed("strays", vec![fixtures::charlie()]);
    let feed = PollingFeed::new(store.clone(), Duration::from_millis(200));
    let roster = RosterViewModel::new(
        DataSource::new(store.clone(), Arc::new(feed)),
        RosterConfig::default(),
    );

    assert_eq!(
        roster.mount().await.unwrap(),
        FetchOutcome::Applied { seq: 1, count: 1 }
    );

    // Let the poller take its baseline.
    tokio::time::sleep(Duration::from_millis(500)).await;
    store
        .insert("strays", &StrayDraft::new("Mochi"))
        .await
        .unwrap();

    let state = wait_for(&roster, |s| s.snapshot.len() == 2).await;
    assert_eq!(state.phase, RosterPhase::Ready);
    assert_eq!(state.snapshot[0].name, "Mochi");

    roster.teardown().await;
}

#[tokio::test]
async fn empty_collection_is_ready_and_empty() {
    let store = Arc::new(InMemoryStore::new());
    let roster = RosterViewModel::new(
        DataSource::from_backend(store),
        RosterConfig::default(),
    );
    roster.mount().await.unwrap();

    let state = roster.state();
    assert_eq!(state.phase, RosterPhase::Ready);
    assert!(state.is_empty());
    roster.teardown().await;
}
