//! Mood selection records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grid::Mood;
use crate::identity::UserSession;

/// One participant's current mood pick, as stored in the `mood_selections` table.
///
/// At most one record exists per `session_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSelection {
    /// Server-assigned identifier (UUID format)
    pub id: String,
    /// Display name captured when the identity was created
    pub user_name: String,
    /// Display colour captured when the identity was created
    pub user_color: String,
    /// Currently selected mood
    pub selected_mood: Mood,
    /// Stable key of the local identity that owns this record
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    /// Advances on every mood change
    pub updated_at: DateTime<Utc>,
}

impl MoodSelection {
    /// Builds a locally generated stand-in for a record the server has not
    /// confirmed yet.
    pub fn provisional(identity: &UserSession, mood: Mood, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_name: identity.user_name.clone(),
            user_color: identity.user_color.clone(),
            selected_mood: mood,
            session_id: identity.session_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the mood replaced and `updated_at` advanced.
    pub fn with_mood(&self, mood: Mood, at: DateTime<Utc>) -> Self {
        Self {
            selected_mood: mood,
            updated_at: at,
            ..self.clone()
        }
    }

    pub fn belongs_to(&self, session_id: &str) -> bool {
        self.session_id == session_id
    }
}

/// Insert payload; the datastore assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMoodSelection {
    pub user_name: String,
    pub user_color: String,
    pub selected_mood: Mood,
    pub session_id: String,
}

impl NewMoodSelection {
    pub fn from_identity(identity: &UserSession, mood: Mood) -> Self {
        Self {
            user_name: identity.user_name.clone(),
            user_color: identity.user_color.clone(),
            selected_mood: mood,
            session_id: identity.session_id.clone(),
        }
    }
}

/// Update payload for an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodPatch {
    pub selected_mood: Mood,
    pub updated_at: DateTime<Utc>,
}

impl MoodPatch {
    pub fn new(selected_mood: Mood) -> Self {
        Self {
            selected_mood,
            updated_at: Utc::now(),
        }
    }
}
