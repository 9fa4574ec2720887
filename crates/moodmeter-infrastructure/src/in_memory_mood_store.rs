//! In-process stand-in for the hosted `mood_selections` table and its
//! realtime change feed.
//!
//! Behaves like the remote datastore as far as the client can observe:
//! server-assigned ids and timestamps, a unique constraint on `session_id`,
//! and one change event per committed row change delivered to every
//! subscriber of the table. Reachability and write rejection can be toggled
//! to exercise failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use moodmeter_core::error::{MoodError, Result};
use moodmeter_core::mood::{
    ChangeFeed, MoodChangeEvent, MoodPatch, MoodRepository, MoodSelection, NewMoodSelection,
    Subscription, SubscriptionHandle,
};

pub const DEFAULT_TABLE: &str = "mood_selections";

struct Subscriber {
    table: String,
    sender: mpsc::UnboundedSender<MoodChangeEvent>,
}

#[derive(Default)]
struct StoreInner {
    records: Vec<MoodSelection>,
    subscribers: HashMap<u64, Subscriber>,
}

pub struct InMemoryMoodStore {
    table: String,
    inner: Mutex<StoreInner>,
    reachable: AtomicBool,
    reject_writes: AtomicBool,
    next_subscription_id: AtomicU64,
}

impl Default for InMemoryMoodStore {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl InMemoryMoodStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            inner: Mutex::new(StoreInner::default()),
            reachable: AtomicBool::new(true),
            reject_writes: AtomicBool::new(false),
            next_subscription_id: AtomicU64::new(1),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// When false, reads and subscriptions fail with `DataUnavailable` and
    /// writes with `WriteRejected`.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// When true, every write fails with `WriteRejected`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of subscriptions not yet released.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.lock().map(|inner| inner.subscribers.len()).unwrap_or(0)
    }

    /// Drops every subscriber's sender, ending their event streams.
    pub fn close_feeds(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            for subscriber in inner.subscribers.values_mut() {
                let (closed, _) = mpsc::unbounded_channel();
                subscriber.sender = closed;
            }
        }
    }

    /// Snapshot of the stored rows in insertion order.
    pub fn records(&self) -> Vec<MoodSelection> {
        self.inner
            .lock()
            .map(|inner| inner.records.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|e| MoodError::internal(format!("mood store lock poisoned: {}", e)))
    }

    fn check_readable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MoodError::data_unavailable("datastore unreachable"))
        }
    }

    fn check_writable(&self, operation: &'static str) -> Result<()> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(MoodError::write_rejected(operation, "datastore unreachable"));
        }
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(MoodError::write_rejected(operation, "write refused by datastore"));
        }
        Ok(())
    }

    fn broadcast(&self, inner: &mut StoreInner, event: MoodChangeEvent) {
        let table = &self.table;
        inner.subscribers.retain(|id, subscriber| {
            if subscriber.table != *table {
                return true;
            }
            let delivered = subscriber.sender.send(event.clone()).is_ok();
            if !delivered {
                tracing::debug!("[InMemoryMoodStore] Dropping closed subscription {}", id);
            }
            delivered
        });
    }
}

#[async_trait]
impl MoodRepository for InMemoryMoodStore {
    async fn fetch_all(&self) -> Result<Vec<MoodSelection>> {
        self.check_readable()?;
        let mut records = self.lock()?.records.clone();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn insert(&self, record: NewMoodSelection) -> Result<MoodSelection> {
        self.check_writable("insert")?;
        let mut inner = self.lock()?;

        if inner.records.iter().any(|r| r.session_id == record.session_id) {
            return Err(MoodError::write_rejected(
                "insert",
                format!(
                    "duplicate key value violates unique constraint on session_id '{}'",
                    record.session_id
                ),
            ));
        }

        let now = Utc::now();
        let stored = MoodSelection {
            id: Uuid::new_v4().to_string(),
            user_name: record.user_name,
            user_color: record.user_color,
            selected_mood: record.selected_mood,
            session_id: record.session_id,
            created_at: now,
            updated_at: now,
        };
        inner.records.push(stored.clone());
        tracing::debug!("[InMemoryMoodStore] Inserted {}", stored.id);

        self.broadcast(&mut inner, MoodChangeEvent::Inserted {
            record: stored.clone(),
        });
        Ok(stored)
    }

    async fn update_by_id(&self, id: &str, patch: MoodPatch) -> Result<()> {
        self.check_writable("update")?;
        let mut inner = self.lock()?;

        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MoodError::not_found("mood_selection", id))?;
        record.selected_mood = patch.selected_mood;
        record.updated_at = patch.updated_at;
        let updated = record.clone();

        self.broadcast(&mut inner, MoodChangeEvent::Updated { record: updated });
        Ok(())
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<MoodSelection>> {
        self.check_readable()?;
        Ok(self
            .lock()?
            .records
            .iter()
            .find(|r| r.session_id == session_id)
            .cloned())
    }

    async fn delete_by_session_id(&self, session_id: &str) -> Result<()> {
        self.check_writable("delete")?;
        let mut inner = self.lock()?;

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut inner.records)
            .into_iter()
            .partition(|r| r.session_id == session_id);
        inner.records = kept;

        for record in removed {
            tracing::debug!("[InMemoryMoodStore] Deleted {}", record.id);
            self.broadcast(&mut inner, MoodChangeEvent::Deleted { id: record.id });
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for InMemoryMoodStore {
    async fn subscribe(&self, table: &str) -> Result<Subscription> {
        self.check_readable()?;

        let id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);
        let (sender, events) = mpsc::unbounded_channel();
        self.lock()?.subscribers.insert(
            id,
            Subscriber {
                table: table.to_string(),
                sender,
            },
        );
        tracing::debug!("[InMemoryMoodStore] Subscription {} opened on {}", id, table);

        Ok(Subscription {
            handle: SubscriptionHandle::new(id, table),
            events,
        })
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        if let Ok(mut inner) = self.inner.lock()
            && inner.subscribers.remove(&handle.id()).is_some()
        {
            tracing::debug!(
                "[InMemoryMoodStore] Subscription {} released on {}",
                handle.id(),
                handle.table()
            );
        }
    }
}
