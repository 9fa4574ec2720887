//! Identity domain module.
//!
//! # Module Structure
//!
//! - `model`: The local participant identity (`UserSession`)
//! - `store`: Persistence trait (`IdentityStore`)
//! - `context`: Explicit session context (`SessionContext`)

mod context;
mod model;
mod store;

// Re-export public API
pub use context::SessionContext;
pub use model::{UserSession, pastel_color};
pub use store::IdentityStore;
