//! Identity store trait.

use super::model::UserSession;
use crate::error::Result;

/// Durable local storage for the participant identity.
///
/// Implementations must treat unreadable or malformed persisted data as
/// absence: `load` returns `None` and purges the corrupt entry instead of
/// failing.
pub trait IdentityStore: Send + Sync {
    /// Returns the persisted identity, if a valid one exists.
    fn load(&self) -> Option<UserSession>;

    /// Persists the identity, replacing any previous one.
    fn save(&self, session: &UserSession) -> Result<()>;

    /// Removes the persisted identity (no-op if none exists).
    fn clear(&self) -> Result<()>;
}
