//! Local stand-in for the email one-time-code identity provider.
//!
//! Codes are logged instead of emailed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use moodmeter_core::auth::{AuthError, AuthSession, AuthenticatedUser, IdentityProvider};

const CODE_TTL_MINUTES: i64 = 10;

struct IssuedCode {
    code: String,
    issued_at: DateTime<Utc>,
}

#[derive(Default)]
struct ProviderState {
    codes: HashMap<String, IssuedCode>,
    session: Option<AuthSession>,
}

#[derive(Default)]
pub struct DevIdentityProvider {
    state: Mutex<ProviderState>,
}

impl DevIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding code for `email`, for tests and the CLI login prompt.
    pub fn issued_code(&self, email: &str) -> Option<String> {
        self.state
            .lock()
            .ok()?
            .codes
            .get(&normalize(email))
            .map(|issued| issued.code.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ProviderState) -> R) -> Result<R, AuthError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| AuthError::Provider(format!("provider state poisoned: {}", e)))?;
        Ok(f(&mut state))
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = normalize(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

#[async_trait]
impl IdentityProvider for DevIdentityProvider {
    async fn request_code(&self, email: &str) -> Result<(), AuthError> {
        let email = validate_email(email)?;
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));

        tracing::info!("[DevIdentityProvider] Verification code for {}: {}", email, code);
        self.with_state(|state| {
            state.codes.insert(
                email,
                IssuedCode {
                    code,
                    issued_at: Utc::now(),
                },
            );
        })
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<AuthenticatedUser, AuthError> {
        let email = validate_email(email)?;
        let now = Utc::now();

        self.with_state(|state| {
            let issued = state.codes.get(&email).ok_or(AuthError::InvalidCode)?;
            if now - issued.issued_at > Duration::minutes(CODE_TTL_MINUTES) {
                state.codes.remove(&email);
                return Err(AuthError::CodeExpired);
            }
            if issued.code != code.trim() {
                return Err(AuthError::InvalidCode);
            }

            state.codes.remove(&email);
            let user = AuthenticatedUser::from_email(email);
            state.session = Some(AuthSession::start(user.clone(), now));
            tracing::info!("[DevIdentityProvider] Signed in {}", user.email);
            Ok(user)
        })?
    }

    async fn current_session(&self) -> Option<AuthSession> {
        let now = Utc::now();
        self.with_state(|state| {
            if state.session.as_ref().is_some_and(|s| s.is_expired(now)) {
                state.session = None;
            }
            state.session.clone()
        })
        .ok()
        .flatten()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.with_state(|state| state.session.take())?
            .map(|_| ())
            .ok_or(AuthError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_code_flow_signs_in() {
        let provider = DevIdentityProvider::new();
        provider.request_code("John.Doe@example.com").await.unwrap();
        let code = provider.issued_code("john.doe@example.com").unwrap();
        assert_eq!(code.len(), 6);

        let user = provider.verify_code("john.doe@example.com", &code).await.unwrap();
        assert_eq!(user.display_name, "John");
        assert!(provider.current_session().await.is_some());
        assert!(provider.issued_code("john.doe@example.com").is_none());
    }

    #[tokio::test]
    async fn test_wrong_code_is_rejected() {
        let provider = DevIdentityProvider::new();
        provider.request_code("jane@example.com").await.unwrap();
        let code = provider.issued_code("jane@example.com").unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let err = provider.verify_code("jane@example.com", wrong).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCode);
        assert!(provider.current_session().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let provider = DevIdentityProvider::new();
        let err = provider.request_code("not-an-email").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let provider = DevIdentityProvider::new();
        assert_eq!(provider.sign_out().await, Err(AuthError::NotAuthenticated));

        provider.request_code("jane@example.com").await.unwrap();
        let code = provider.issued_code("jane@example.com").unwrap();
        provider.verify_code("jane@example.com", &code).await.unwrap();

        provider.sign_out().await.unwrap();
        assert!(provider.current_session().await.is_none());
    }
}
