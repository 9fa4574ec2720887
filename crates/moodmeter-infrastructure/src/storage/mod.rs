//! File-backed storage primitives.

pub mod atomic_file;
pub mod local_storage;

pub use atomic_file::{AtomicFile, FileFormat};
pub use local_storage::LocalStorage;
