//! Local participant identity.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MoodError, Result};

/// The durable (name, colour, session id) triple representing one participant.
///
/// Created on the first mood pick, kept across restarts, destroyed on reset.
/// Serialized in camelCase to match the local-storage record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// Random, stable key (UUID format)
    pub session_id: String,
    /// Display name as captured, trimmed
    pub user_name: String,
    /// Random pastel colour, `hsl(H, 70%, 80%)`
    pub user_color: String,
}

impl UserSession {
    /// Generates a fresh identity for `name`.
    ///
    /// # Errors
    ///
    /// `InvalidName` when the name is empty after trimming.
    pub fn generate(name: &str) -> Result<Self> {
        let user_name = name.trim();
        if user_name.is_empty() {
            return Err(MoodError::InvalidName("name must not be blank".to_string()));
        }

        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            user_name: user_name.to_string(),
            user_color: pastel_color(),
        })
    }

    /// Whether every field carries a value; persisted records failing this
    /// check are treated as corrupt.
    pub fn is_complete(&self) -> bool {
        !self.session_id.trim().is_empty()
            && !self.user_name.trim().is_empty()
            && !self.user_color.trim().is_empty()
    }
}

/// Returns a random pastel colour in CSS `hsl()` notation.
pub fn pastel_color() -> String {
    let hue = rand::thread_rng().gen_range(0..360);
    format!("hsl({}, 70%, 80%)", hue)
}
