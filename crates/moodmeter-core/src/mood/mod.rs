//! Mood domain module.
//!
//! # Module Structure
//!
//! - `grid`: The 10×10 mood vocabulary (`Mood`, `Quadrant`, `MOOD_GRID`)
//! - `model`: Mood selection records and write payloads
//! - `event`: Realtime change notifications
//! - `repository`: Datastore and change-feed traits
//!
//! # Usage
//!
//! ```ignore
//! use moodmeter_core::mood::{Mood, MoodSelection, MoodRepository, ChangeFeed};
//! ```

mod event;
mod grid;
mod model;
mod repository;

// Re-export public API
pub use event::{ChangeKind, MoodChangeEvent};
pub use grid::{GRID_SIZE, MOOD_GRID, Mood, Quadrant};
pub use model::{MoodPatch, MoodSelection, NewMoodSelection};
pub use repository::{ChangeFeed, MoodRepository, Subscription, SubscriptionHandle};
