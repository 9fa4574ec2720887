//! Explicit session context.
//!
//! Holds the current identity together with the store that persists it, so
//! callers pass one value around instead of reaching into storage directly.

use std::sync::Arc;

use super::model::UserSession;
use super::store::IdentityStore;
use crate::error::Result;

pub struct SessionContext {
    store: Arc<dyn IdentityStore>,
    current: Option<UserSession>,
}

impl SessionContext {
    /// Builds a context from whatever identity the store currently holds.
    pub fn restore(store: Arc<dyn IdentityStore>) -> Self {
        let current = store.load();
        if let Some(ref session) = current {
            tracing::debug!(
                "[SessionContext] Restored identity: session_id={}, name={}",
                session.session_id,
                session.user_name
            );
        }
        Self { store, current }
    }

    pub fn current(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }

    pub fn has_identity(&self) -> bool {
        self.current.is_some()
    }

    /// Persists `session` and makes it the current identity.
    ///
    /// The identity only becomes current once it has been saved.
    pub fn establish(&mut self, session: UserSession) -> Result<&UserSession> {
        self.store.save(&session)?;
        tracing::info!(
            "[SessionContext] Established identity: session_id={}",
            session.session_id
        );
        Ok(&*self.current.insert(session))
    }

    /// Drops the current identity and clears the store.
    ///
    /// The in-memory identity is cleared even if the store fails; the failure
    /// is logged.
    pub fn clear(&mut self) -> Option<UserSession> {
        if let Err(e) = self.store.clear() {
            tracing::warn!("[SessionContext] Failed to clear persisted identity: {}", e);
        }
        self.current.take()
    }
}
