//! `IdentityStore` backed by the local key-value file.

use std::path::PathBuf;

use moodmeter_core::error::Result;
use moodmeter_core::identity::{IdentityStore, UserSession};

use crate::storage::LocalStorage;

/// Persists the identity as a JSON value under a single storage key.
pub struct FileIdentityStore {
    storage: LocalStorage,
    key: String,
}

impl FileIdentityStore {
    pub fn new(path: PathBuf, key: impl Into<String>) -> Self {
        Self {
            storage: LocalStorage::new(path),
            key: key.into(),
        }
    }

    fn purge(&self, reason: &str) {
        tracing::warn!("[FileIdentityStore] Discarding stored identity: {}", reason);
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!("[FileIdentityStore] Failed to purge identity: {}", e);
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Option<UserSession> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                self.purge(&e.to_string());
                return None;
            }
        };

        match serde_json::from_str::<UserSession>(&raw) {
            Ok(session) if session.is_complete() => {
                tracing::debug!("[FileIdentityStore] Restored identity {}", session.session_id);
                Some(session)
            }
            Ok(_) => {
                self.purge("missing fields");
                None
            }
            Err(e) => {
                self.purge(&e.to_string());
                None
            }
        }
    }

    fn save(&self, session: &UserSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.storage.set(&self.key, raw)
    }

    fn clear(&self) -> Result<()> {
        self.storage.remove(&self.key)
    }
}
