//! Application layer for moodmeter.
//!
//! Coordinates the domain synchronizer with the datastore's change feed and
//! with user interaction.

pub mod board;
pub mod interaction;

pub use board::{BoardStatus, MoodBoard};
pub use interaction::{InteractionController, InteractionState};
