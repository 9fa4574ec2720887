//! Mood selection synchronizer.
//!
//! Keeps the confirmed record set in step with the change feed and layers
//! optimistic overlays on top of it while local writes are in flight.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::failure::{
    FailureAction, TracingFailureSink, WriteFailure, WriteFailureSink, WriteOperation, WritePolicy,
};
use super::state::{SyncState, SyncTransition};
use crate::error::{MoodError, Result};
use crate::identity::{SessionContext, UserSession};
use crate::mood::{Mood, MoodChangeEvent, MoodPatch, MoodRepository, MoodSelection, NewMoodSelection};

/// Result of a remote write task.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    /// A row was inserted; carries the server's version of it.
    Inserted(MoodSelection),
    /// The row with this id was updated.
    Updated { id: String },
    Deleted,
    /// The write failed; the failure has already been reported.
    Failed(MoodError),
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// A remote write running in the background.
///
/// Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    operation: WriteOperation,
    handle: JoinHandle<WriteOutcome>,
}

impl PendingWrite {
    pub fn operation(&self) -> WriteOperation {
        self.operation
    }

    /// Waits for the write to finish.
    pub async fn outcome(self) -> WriteOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => WriteOutcome::Failed(MoodError::internal(format!(
                "{} task did not complete: {}",
                self.operation, e
            ))),
        }
    }
}

/// Reconciles local optimistic edits with the authoritative record set.
#[derive(Clone)]
pub struct MoodSynchronizer {
    repository: Arc<dyn MoodRepository>,
    state: Arc<RwLock<SyncState>>,
    policy: WritePolicy,
    sink: Arc<dyn WriteFailureSink>,
}

impl MoodSynchronizer {
    /// Creates a synchronizer with an empty confirmed set, the default
    /// [`WritePolicy`] and a logging failure sink.
    pub fn new(repository: Arc<dyn MoodRepository>) -> Self {
        Self {
            repository,
            state: Arc::new(RwLock::new(SyncState::default())),
            policy: WritePolicy::default(),
            sink: Arc::new(TracingFailureSink),
        }
    }

    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_failure_sink(mut self, sink: Arc<dyn WriteFailureSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    pub fn repository(&self) -> Arc<dyn MoodRepository> {
        self.repository.clone()
    }

    /// The only state the UI reads.
    pub async fn current_view(&self) -> Vec<MoodSelection> {
        self.state.read().await.current_view().to_vec()
    }

    /// A copy of the full (confirmed, overlay) state.
    pub async fn state(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// Installs an authoritative listing, dropping any overlay.
    pub async fn replace_confirmed(&self, records: Vec<MoodSelection>) {
        tracing::debug!("[MoodSynchronizer] Installing snapshot of {} records", records.len());
        self.state
            .write()
            .await
            .apply(SyncTransition::Snapshot(records));
    }

    /// Applies a change notification and clears the overlay.
    pub async fn on_remote_change(&self, event: MoodChangeEvent) {
        tracing::debug!(
            "[MoodSynchronizer] Remote {} for record {}",
            event.kind(),
            event.record_id()
        );
        self.state.write().await.apply(SyncTransition::Remote(event));
    }

    /// Shows a new identity's record immediately, then inserts it remotely.
    pub async fn create(&self, identity: &UserSession, mood: Mood) -> PendingWrite {
        let provisional = MoodSelection::provisional(identity, mood, Utc::now());
        let generation = {
            let mut state = self.state.write().await;
            let records = state.optimistic_create(provisional);
            state.install_overlay(records)
        };
        tracing::debug!(
            "[MoodSynchronizer] create: session_id={}, mood={}, overlay={}",
            identity.session_id,
            mood,
            generation
        );

        let repository = self.repository.clone();
        let payload = NewMoodSelection::from_identity(identity, mood);
        self.spawn_write(
            WriteOperation::Create,
            identity.session_id.clone(),
            Some((generation, self.policy.on_create_failure)),
            async move { repository.insert(payload).await.map(WriteOutcome::Inserted) },
        )
    }

    /// Shows the new mood immediately, then updates (or, if the record has
    /// not reached the datastore yet, inserts) the session's remote record.
    pub async fn update(&self, identity: &UserSession, mood: Mood) -> PendingWrite {
        let generation = {
            let mut state = self.state.write().await;
            let records = state.optimistic_update(identity, mood, Utc::now());
            state.install_overlay(records)
        };
        tracing::debug!(
            "[MoodSynchronizer] update: session_id={}, mood={}, overlay={}",
            identity.session_id,
            mood,
            generation
        );

        let repository = self.repository.clone();
        let identity_for_write = identity.clone();
        self.spawn_write(
            WriteOperation::Update,
            identity.session_id.clone(),
            Some((generation, self.policy.on_update_failure)),
            async move { write_mood(repository.as_ref(), &identity_for_write, mood).await },
        )
    }

    /// Requests remote deletion of the current identity's record and clears
    /// the identity without waiting for the datastore.
    ///
    /// Returns `None` when the context holds no identity.
    pub fn remove(&self, context: &mut SessionContext) -> Option<PendingWrite> {
        let session_id = context.current()?.session_id.clone();

        let repository = self.repository.clone();
        let target = session_id.clone();
        let pending = self.spawn_write(WriteOperation::Delete, session_id, None, async move {
            repository
                .delete_by_session_id(&target)
                .await
                .map(|()| WriteOutcome::Deleted)
        });

        context.clear();
        Some(pending)
    }

    /// Runs `write` in the background and routes its failure through the
    /// policy and the sink.
    ///
    /// `overlay` names the overlay generation the write installed and what to
    /// do with it on failure.
    fn spawn_write<F>(
        &self,
        operation: WriteOperation,
        session_id: String,
        overlay: Option<(u64, FailureAction)>,
        write: F,
    ) -> PendingWrite
    where
        F: Future<Output = Result<WriteOutcome>> + Send + 'static,
    {
        let state = self.state.clone();
        let sink = self.sink.clone();

        let handle = tokio::spawn(async move {
            match write.await {
                Ok(outcome) => {
                    tracing::debug!(
                        "[MoodSynchronizer] Remote {} succeeded for session_id={}",
                        operation,
                        session_id
                    );
                    outcome
                }
                Err(error) => {
                    if let Some((generation, FailureAction::Revert)) = overlay {
                        state
                            .write()
                            .await
                            .apply(SyncTransition::Revert { generation });
                    }

                    sink.report(&WriteFailure {
                        operation,
                        session_id,
                        error: error.clone(),
                        action: overlay.map(|(_, action)| action),
                    });
                    WriteOutcome::Failed(error)
                }
            }
        });

        PendingWrite { operation, handle }
    }
}

/// Find-or-insert: updates the session's record when the datastore has one,
/// otherwise inserts it, so a session never ends up with two rows.
async fn write_mood(
    repository: &dyn MoodRepository,
    identity: &UserSession,
    mood: Mood,
) -> Result<WriteOutcome> {
    match repository.find_by_session_id(&identity.session_id).await? {
        Some(existing) => {
            repository
                .update_by_id(&existing.id, MoodPatch::new(mood))
                .await?;
            Ok(WriteOutcome::Updated { id: existing.id })
        }
        None => {
            tracing::info!(
                "[MoodSynchronizer] No remote record for session_id={}, inserting",
                identity.session_id
            );
            let record = repository
                .insert(NewMoodSelection::from_identity(identity, mood))
                .await?;
            Ok(WriteOutcome::Inserted(record))
        }
    }
}
