//! Optimistic-update and realtime-reconciliation logic.
//!
//! - `state`: Pure (confirmed, optimistic) state and its transitions
//! - `failure`: Write-failure policy and the reporting sink
//! - `synchronizer`: `MoodSynchronizer`, which drives remote writes

mod failure;
mod state;
mod synchronizer;

pub use failure::{
    FailureAction, TracingFailureSink, WriteFailure, WriteFailureSink, WriteOperation, WritePolicy,
};
pub use state::{Overlay, SyncState, SyncTransition, reconcile};
pub use synchronizer::{MoodSynchronizer, PendingWrite, WriteOutcome};
