//! End-to-end board behaviour against the in-process datastore.

use std::sync::Arc;
use std::time::Duration;

use moodmeter_application::{BoardStatus, InteractionController, InteractionState, MoodBoard};
use moodmeter_core::identity::SessionContext;
use moodmeter_core::mood::{Mood, MoodSelection};
use moodmeter_core::presentation::roster;
use moodmeter_core::sync::MoodSynchronizer;
use moodmeter_infrastructure::in_memory_mood_store::DEFAULT_TABLE;
use moodmeter_infrastructure::{FileIdentityStore, InMemoryMoodStore};
use tempfile::TempDir;

fn mood(label: &str) -> Mood {
    Mood::parse(label).unwrap()
}

struct Participant {
    _dir: TempDir,
    controller: InteractionController,
}

fn participant(synchronizer: &Arc<MoodSynchronizer>) -> Participant {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileIdentityStore::new(
        dir.path().join("local_storage.json"),
        "moodmeter-session",
    ));
    let context = SessionContext::restore(store);
    Participant {
        _dir: dir,
        controller: InteractionController::new(context, synchronizer.clone()),
    }
}

async fn started_board(store: &Arc<InMemoryMoodStore>) -> MoodBoard {
    let synchronizer = Arc::new(MoodSynchronizer::new(store.clone()));
    let board = MoodBoard::new(synchronizer, store.clone(), DEFAULT_TABLE);
    board.start().await.unwrap();
    board
}

/// Polls until `check` holds for the current view or the deadline passes.
async fn eventually<F>(synchronizer: &MoodSynchronizer, check: F) -> Vec<MoodSelection>
where
    F: Fn(&SyncView) -> bool,
{
    for _ in 0..100 {
        let view = SyncView::capture(synchronizer).await;
        if check(&view) {
            return view.current;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

struct SyncView {
    current: Vec<MoodSelection>,
    confirmed: Vec<MoodSelection>,
    has_overlay: bool,
}

impl SyncView {
    async fn capture(synchronizer: &MoodSynchronizer) -> Self {
        let state = synchronizer.state().await;
        Self {
            current: state.current_view().to_vec(),
            confirmed: state.confirmed().to_vec(),
            has_overlay: state.overlay().is_some(),
        }
    }
}

#[tokio::test]
async fn test_end_to_end_create_update_remove() {
    let store = Arc::new(InMemoryMoodStore::default());
    let board = started_board(&store).await;
    let synchronizer = board.synchronizer().clone();
    let mut ada = participant(&synchronizer);

    assert_eq!(board.status().await, BoardStatus::Ready);
    assert!(synchronizer.current_view().await.is_empty());

    // Create: visible immediately, then confirmed by the echo.
    ada.controller.click(mood("Calm")).await;
    let pending = ada.controller.submit_name("Ada").await.unwrap();
    let view = synchronizer.current_view().await;
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].selected_mood, mood("Calm"));
    assert!(pending.outcome().await.is_success());

    let confirmed = eventually(&synchronizer, |v| !v.has_overlay && v.confirmed.len() == 1).await;
    let row_id = confirmed[0].id.clone();

    // Update: same row, new mood.
    let pending = ada.controller.click(mood("Excited")).await.unwrap();
    assert_eq!(synchronizer.current_view().await[0].selected_mood, mood("Excited"));
    assert!(pending.outcome().await.is_success());

    let view = eventually(&synchronizer, |v| {
        !v.has_overlay && v.confirmed[0].selected_mood == mood("Excited")
    })
    .await;
    assert_eq!(view[0].id, row_id);
    assert_eq!(store.records().len(), 1);

    // Remove: identity gone at once, row gone once the delete is echoed.
    let pending = ada.controller.reset().unwrap();
    assert_eq!(ada.controller.state(), InteractionState::NoIdentity);
    assert!(pending.outcome().await.is_success());

    eventually(&synchronizer, |v| v.current.is_empty()).await;
    board.stop().await;
}

#[tokio::test]
async fn test_one_record_per_session_across_updates() {
    let store = Arc::new(InMemoryMoodStore::default());
    let board = started_board(&store).await;
    let synchronizer = board.synchronizer().clone();
    let mut ada = participant(&synchronizer);
    let mut bob = participant(&synchronizer);

    ada.controller.click(mood("Calm")).await;
    ada.controller.submit_name("Ada").await.unwrap().outcome().await;
    bob.controller.click(mood("Calm")).await;
    bob.controller.submit_name("Bob").await.unwrap().outcome().await;

    for label in ["Sad", "Calm", "Happy"] {
        ada.controller.click(mood(label)).await.unwrap().outcome().await;
    }

    let view = eventually(&synchronizer, |v| {
        !v.has_overlay
            && v.confirmed.len() == 2
            && v.confirmed.iter().any(|r| r.selected_mood == mood("Happy"))
    })
    .await;

    let entries = roster(&view);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].user_name, "Ada");
    assert_eq!(entries[0].feeling(), "Feeling happy");
    assert_eq!(store.records().len(), 2);
    board.stop().await;
}

#[tokio::test]
async fn test_rejected_update_reverts_to_confirmed() {
    let store = Arc::new(InMemoryMoodStore::default());
    let board = started_board(&store).await;
    let synchronizer = board.synchronizer().clone();
    let mut ada = participant(&synchronizer);

    ada.controller.click(mood("Calm")).await;
    ada.controller.submit_name("Ada").await.unwrap().outcome().await;
    let before = eventually(&synchronizer, |v| !v.has_overlay && v.confirmed.len() == 1).await;

    store.set_reject_writes(true);
    let outcome = ada.controller.click(mood("Sad")).await.unwrap().outcome().await;
    assert!(!outcome.is_success());

    assert_eq!(synchronizer.current_view().await, before);
    board.stop().await;
}

#[tokio::test]
async fn test_unreachable_store_blocks_then_recovers() {
    let store = Arc::new(InMemoryMoodStore::default());
    store.set_reachable(false);
    let synchronizer = Arc::new(MoodSynchronizer::new(store.clone()));
    let board = MoodBoard::new(synchronizer, store.clone(), DEFAULT_TABLE);

    assert!(board.start().await.is_err());
    assert!(matches!(board.status().await, BoardStatus::Unavailable(_)));
    assert_eq!(store.active_subscriptions(), 0);

    store.set_reachable(true);
    board.start().await.unwrap();
    assert_eq!(board.status().await, BoardStatus::Ready);
    assert_eq!(store.active_subscriptions(), 1);
}

#[tokio::test]
async fn test_subscription_released_exactly_once() {
    let store = Arc::new(InMemoryMoodStore::default());

    let board = started_board(&store).await;
    assert_eq!(store.active_subscriptions(), 1);
    board.stop().await;
    board.stop().await;
    assert_eq!(store.active_subscriptions(), 0);
    assert!(!board.is_observing().await);

    let board = started_board(&store).await;
    store.close_feeds();
    for _ in 0..100 {
        if store.active_subscriptions() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(store.active_subscriptions(), 0);
    drop(board);

    {
        let _board = started_board(&store).await;
        assert_eq!(store.active_subscriptions(), 1);
    }
    assert_eq!(store.active_subscriptions(), 0);
}
