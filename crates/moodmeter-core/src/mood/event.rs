//! Change events pushed by the mood datastore.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::model::MoodSelection;

/// Kind of row change, named as the realtime feed names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A change notification from the `mood_selections` feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoodChangeEvent {
    /// A record was created.
    Inserted { record: MoodSelection },
    /// A record was modified; carries its new state.
    Updated { record: MoodSelection },
    /// A record was removed; only its id survives.
    Deleted { id: String },
}

impl MoodChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Inserted { .. } => ChangeKind::Insert,
            Self::Updated { .. } => ChangeKind::Update,
            Self::Deleted { .. } => ChangeKind::Delete,
        }
    }

    /// Id of the affected record.
    pub fn record_id(&self) -> &str {
        match self {
            Self::Inserted { record } | Self::Updated { record } => &record.id,
            Self::Deleted { id } => id,
        }
    }
}
