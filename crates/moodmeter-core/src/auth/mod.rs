//! Email sign-in contract and route gating.

mod email;
mod gate;
mod provider;

pub use email::{display_name_from_email, is_session_valid, session_expiry};
pub use gate::{HOME_ROUTE, LOGIN_ROUTE, RouteDecision, RouteGate, VERIFY_ROUTE};
pub use provider::{AuthError, AuthSession, AuthenticatedUser, IdentityProvider};
