//! Write-failure policy and reporting.
//!
//! Remote writes run as detached tasks. When one fails, the synchronizer
//! consults [`WritePolicy`] for what to do with the optimistic overlay and
//! hands a [`WriteFailure`] to the configured [`WriteFailureSink`].

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::MoodError;

/// What to do with the optimistic overlay when its remote write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureAction {
    /// Drop the overlay so the view falls back to confirmed state.
    Revert,
    /// Keep showing the overlay until the next confirmed change.
    LeaveStale,
}

/// Per-operation failure handling.
///
/// The default keeps a failed create on screen and reverts a failed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritePolicy {
    pub on_create_failure: FailureAction,
    pub on_update_failure: FailureAction,
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            on_create_failure: FailureAction::LeaveStale,
            on_update_failure: FailureAction::Revert,
        }
    }
}

impl WritePolicy {
    /// Reverts on every failure.
    pub fn always_revert() -> Self {
        Self {
            on_create_failure: FailureAction::Revert,
            on_update_failure: FailureAction::Revert,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum WriteOperation {
    Create,
    Update,
    Delete,
}

/// A failed remote write as reported to the sink.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub operation: WriteOperation,
    pub session_id: String,
    pub error: MoodError,
    /// Action taken on the overlay; `None` for deletes, which have none.
    pub action: Option<FailureAction>,
}

/// Receives every remote-write failure.
pub trait WriteFailureSink: Send + Sync {
    fn report(&self, failure: &WriteFailure);
}

/// Default sink: logs failures at error level.
#[derive(Debug, Clone, Default)]
pub struct TracingFailureSink;

impl WriteFailureSink for TracingFailureSink {
    fn report(&self, failure: &WriteFailure) {
        tracing::error!(
            operation = %failure.operation,
            session_id = %failure.session_id,
            action = ?failure.action,
            "[MoodSynchronizer] Remote {} failed: {}",
            failure.operation,
            failure.error
        );
    }
}
