//! A small persistent string key-value store, one JSON object on disk.

use std::collections::BTreeMap;
use std::path::PathBuf;

use moodmeter_core::error::Result;

use super::atomic_file::AtomicFile;

type Entries = BTreeMap<String, String>;

pub struct LocalStorage {
    file: AtomicFile<Entries>,
}

impl LocalStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
        }
    }

    /// Returns the value under `key`.
    ///
    /// An unreadable backing file is an error; callers decide whether that
    /// counts as absence.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file.load()?.and_then(|mut entries| entries.remove(key)))
    }

    pub fn set(&self, key: &str, value: String) -> Result<()> {
        self.file.update(Entries::new(), |entries| {
            entries.insert(key.to_string(), value);
        })
    }

    /// Removes `key`. A corrupt backing file is replaced by an empty one.
    pub fn remove(&self, key: &str) -> Result<()> {
        if self.file.load().is_err() {
            tracing::warn!(
                "[LocalStorage] Resetting unreadable {}",
                self.file.path().display()
            );
            return self.file.save(&Entries::new());
        }

        self.file.update(Entries::new(), |entries| {
            entries.remove(key);
        })
    }
}
