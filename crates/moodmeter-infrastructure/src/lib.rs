//! Infrastructure layer for moodmeter.
//!
//! Provides file-backed configuration and identity storage, plus in-process
//! implementations of the datastore and identity-provider contracts.

pub mod config_service;
pub mod dev_identity_provider;
pub mod file_identity_store;
pub mod in_memory_mood_store;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use dev_identity_provider::DevIdentityProvider;
pub use file_identity_store::FileIdentityStore;
pub use in_memory_mood_store::InMemoryMoodStore;
pub use paths::MoodMeterPaths;
