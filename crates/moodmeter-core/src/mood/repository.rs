//! Datastore contracts for mood selections.
//!
//! The remote table and its realtime change feed are external collaborators;
//! these traits are the only surface the synchronizer sees.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::event::MoodChangeEvent;
use super::model::{MoodPatch, MoodSelection, NewMoodSelection};
use crate::error::Result;

/// CRUD access to the `mood_selections` table.
#[async_trait]
pub trait MoodRepository: Send + Sync {
    /// Lists every record, ascending by `created_at`.
    ///
    /// # Errors
    ///
    /// `DataUnavailable` when the datastore cannot be reached.
    async fn fetch_all(&self) -> Result<Vec<MoodSelection>>;

    /// Inserts a record and returns it with its server-assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// `WriteRejected` when the datastore refuses the row.
    async fn insert(&self, record: NewMoodSelection) -> Result<MoodSelection>;

    /// Applies `patch` to the record with the given id.
    ///
    /// # Errors
    ///
    /// `WriteRejected` when the datastore refuses the change.
    async fn update_by_id(&self, id: &str, patch: MoodPatch) -> Result<()>;

    /// Finds the record owned by a session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: The session has a record
    /// - `Ok(None)`: No record yet
    /// - `Err(_)`: Lookup failed
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<MoodSelection>>;

    /// Deletes the record owned by a session (no-op if none exists).
    async fn delete_by_session_id(&self, session_id: &str) -> Result<()>;
}

/// Identifies one live subscription.
///
/// Deliberately not `Clone`: `ChangeFeed::unsubscribe` consumes the handle, so
/// a subscription can only be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: u64,
    table: String,
}

impl SubscriptionHandle {
    pub fn new(id: u64, table: impl Into<String>) -> Self {
        Self {
            id,
            table: table.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

/// A live subscription: its handle plus the stream of change events.
///
/// The stream ends when the feed closes the subscription.
#[derive(Debug)]
pub struct Subscription {
    pub handle: SubscriptionHandle,
    pub events: mpsc::UnboundedReceiver<MoodChangeEvent>,
}

impl Subscription {
    pub fn into_parts(self) -> (SubscriptionHandle, mpsc::UnboundedReceiver<MoodChangeEvent>) {
        (self.handle, self.events)
    }
}

/// Realtime change notifications for a table.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Starts receiving insert/update/delete notifications for `table`.
    async fn subscribe(&self, table: &str) -> Result<Subscription>;

    /// Stops delivery for the subscription and releases it.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}
