//! Mood board service: owns the lifecycle of the change-feed observation.

use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{Context, Result};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use moodmeter_core::mood::{ChangeFeed, MoodChangeEvent, SubscriptionHandle};
use moodmeter_core::sync::MoodSynchronizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardStatus {
    Loading,
    Ready,
    /// The initial load failed. Blocking; `start` may be retried.
    Unavailable(String),
}

/// Releases a subscription at most once, from whichever path gets there first.
struct SubscriptionRelease {
    feed: Arc<dyn ChangeFeed>,
    handle: StdMutex<Option<SubscriptionHandle>>,
}

impl SubscriptionRelease {
    fn new(feed: Arc<dyn ChangeFeed>, handle: SubscriptionHandle) -> Self {
        Self {
            feed,
            handle: StdMutex::new(Some(handle)),
        }
    }

    fn release(&self) {
        let handle = self.handle.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            tracing::debug!("[MoodBoard] Releasing subscription {}", handle.id());
            self.feed.unsubscribe(handle);
        }
    }
}

/// A running observation. Dropping it stops consumption and releases the
/// subscription.
struct Observation {
    token: CancellationToken,
    release: Arc<SubscriptionRelease>,
    task: Option<JoinHandle<()>>,
}

impl Observation {
    fn spawn(
        synchronizer: Arc<MoodSynchronizer>,
        release: Arc<SubscriptionRelease>,
        mut events: mpsc::UnboundedReceiver<MoodChangeEvent>,
    ) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let task_release = release.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => synchronizer.on_remote_change(event).await,
                        None => {
                            tracing::warn!("[MoodBoard] Change feed closed");
                            break;
                        }
                    },
                }
            }
            task_release.release();
        });

        Self {
            token,
            release,
            task: Some(task),
        }
    }

    async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("[MoodBoard] Observation task ended abnormally: {}", e);
        }
        self.release.release();
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.token.cancel();
        self.release.release();
    }
}

/// Loads the board and keeps it in sync with the change feed.
pub struct MoodBoard {
    synchronizer: Arc<MoodSynchronizer>,
    feed: Arc<dyn ChangeFeed>,
    table: String,
    status: RwLock<BoardStatus>,
    observation: Mutex<Option<Observation>>,
}

impl MoodBoard {
    pub fn new(
        synchronizer: Arc<MoodSynchronizer>,
        feed: Arc<dyn ChangeFeed>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            synchronizer,
            feed,
            table: table.into(),
            status: RwLock::new(BoardStatus::Loading),
            observation: Mutex::new(None),
        }
    }

    pub fn synchronizer(&self) -> &Arc<MoodSynchronizer> {
        &self.synchronizer
    }

    pub async fn status(&self) -> BoardStatus {
        self.status.read().await.clone()
    }

    /// Whether change notifications are currently being consumed.
    pub async fn is_observing(&self) -> bool {
        self.observation
            .lock()
            .await
            .as_ref()
            .is_some_and(Observation::is_running)
    }

    /// Subscribes, loads the snapshot, then consumes change notifications in
    /// the background.
    ///
    /// Notifications that arrive while the snapshot loads are applied after
    /// it. On failure the status becomes `Unavailable` and nothing stays
    /// subscribed. Restarts any running observation.
    pub async fn start(&self) -> Result<()> {
        let mut observation = self.observation.lock().await;
        if let Some(previous) = observation.take() {
            previous.stop().await;
        }
        *self.status.write().await = BoardStatus::Loading;

        match self.load().await {
            Ok((release, events)) => {
                *observation = Some(Observation::spawn(
                    self.synchronizer.clone(),
                    release,
                    events,
                ));
                *self.status.write().await = BoardStatus::Ready;
                tracing::info!("[MoodBoard] Observing {}", self.table);
                Ok(())
            }
            Err(e) => {
                tracing::error!("[MoodBoard] Failed to load board: {:#}", e);
                *self.status.write().await = BoardStatus::Unavailable(format!("{:#}", e));
                Err(e)
            }
        }
    }

    /// Stops consuming notifications and releases the subscription.
    ///
    /// Writes already in flight are not aborted.
    pub async fn stop(&self) {
        if let Some(observation) = self.observation.lock().await.take() {
            observation.stop().await;
            tracing::info!("[MoodBoard] Stopped observing {}", self.table);
        }
    }

    async fn load(
        &self,
    ) -> Result<(
        Arc<SubscriptionRelease>,
        mpsc::UnboundedReceiver<MoodChangeEvent>,
    )> {
        let (handle, events) = self
            .feed
            .subscribe(&self.table)
            .await
            .with_context(|| format!("subscribing to changes on {}", self.table))?
            .into_parts();
        let release = Arc::new(SubscriptionRelease::new(self.feed.clone(), handle));

        let records = match self.synchronizer.repository().fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                release.release();
                return Err(e).context("loading mood selections");
            }
        };
        tracing::debug!("[MoodBoard] Loaded {} selections", records.len());
        self.synchronizer.replace_confirmed(records).await;

        Ok((release, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodmeter_core::error::{MoodError, Result as MoodResult};
    use moodmeter_core::mood::{
        MoodPatch, MoodRepository, MoodSelection, NewMoodSelection, Subscription,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockBackend {
        unavailable: AtomicBool,
        subscribed: AtomicUsize,
        released: AtomicUsize,
    }

    #[async_trait]
    impl MoodRepository for MockBackend {
        async fn fetch_all(&self) -> MoodResult<Vec<MoodSelection>> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(MoodError::data_unavailable("offline"));
            }
            Ok(Vec::new())
        }

        async fn insert(&self, _record: NewMoodSelection) -> MoodResult<MoodSelection> {
            Err(MoodError::write_rejected("insert", "read-only mock"))
        }

        async fn update_by_id(&self, _id: &str, _patch: MoodPatch) -> MoodResult<()> {
            Ok(())
        }

        async fn find_by_session_id(&self, _session_id: &str) -> MoodResult<Option<MoodSelection>> {
            Ok(None)
        }

        async fn delete_by_session_id(&self, _session_id: &str) -> MoodResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ChangeFeed for MockBackend {
        async fn subscribe(&self, table: &str) -> MoodResult<Subscription> {
            let id = self.subscribed.fetch_add(1, Ordering::SeqCst) as u64;
            let (_sender, events) = mpsc::unbounded_channel();
            Ok(Subscription {
                handle: SubscriptionHandle::new(id, table),
                events,
            })
        }

        fn unsubscribe(&self, _handle: SubscriptionHandle) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn board(backend: &Arc<MockBackend>) -> MoodBoard {
        let synchronizer = Arc::new(MoodSynchronizer::new(backend.clone()));
        MoodBoard::new(synchronizer, backend.clone(), "mood_selections")
    }

    #[tokio::test]
    async fn test_failed_load_releases_subscription() {
        let backend = Arc::new(MockBackend::default());
        backend.unavailable.store(true, Ordering::SeqCst);
        let board = board(&backend);

        assert!(board.start().await.is_err());
        assert!(matches!(board.status().await, BoardStatus::Unavailable(_)));
        assert_eq!(backend.released.load(Ordering::SeqCst), 1);

        backend.unavailable.store(false, Ordering::SeqCst);
        board.start().await.unwrap();
        assert_eq!(board.status().await, BoardStatus::Ready);
    }

    #[tokio::test]
    async fn test_closed_feed_releases_once() {
        let backend = Arc::new(MockBackend::default());
        let board = board(&backend);

        // The mock drops its sender immediately, so the feed closes at once.
        board.start().await.unwrap();
        tokio::task::yield_now().await;
        board.stop().await;

        assert_eq!(backend.subscribed.load(Ordering::SeqCst), 1);
        assert_eq!(backend.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let backend = Arc::new(MockBackend::default());
        {
            let board = board(&backend);
            board.start().await.unwrap();
        }
        assert_eq!(backend.released.load(Ordering::SeqCst), 1);
    }
}
