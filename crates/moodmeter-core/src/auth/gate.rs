//! Route gating for the sign-in flow.

pub const LOGIN_ROUTE: &str = "/auth/login";
pub const VERIFY_ROUTE: &str = "/auth/verify";
pub const HOME_ROUTE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Proceed,
    Redirect(&'static str),
}

#[derive(Debug, Clone)]
pub struct RouteGate {
    public_routes: Vec<&'static str>,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self {
            public_routes: vec![LOGIN_ROUTE, VERIFY_ROUTE],
        }
    }
}

impl RouteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Public routes match by prefix.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_routes.iter().any(|route| path.starts_with(route))
    }

    pub fn decide(&self, path: &str, authenticated: bool) -> RouteDecision {
        match (authenticated, self.is_public(path)) {
            (false, false) => RouteDecision::Redirect(LOGIN_ROUTE),
            (true, true) => RouteDecision::Redirect(HOME_ROUTE),
            _ => RouteDecision::Proceed,
        }
    }
}
