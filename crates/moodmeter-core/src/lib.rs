//! Domain model and synchronization logic for the shared mood board.
//!
//! Nothing here performs I/O directly: the datastore, change feed and
//! identity storage are traits implemented in `moodmeter-infrastructure`.

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod mood;
pub mod presentation;
pub mod sync;

pub use error::{MoodError, Result};
