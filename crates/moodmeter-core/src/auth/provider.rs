//! Identity-provider contract for email one-time-code sign-in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::email::{display_name_from_email, session_expiry};

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code expired")]
    CodeExpired,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// A user who completed code verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub email: String,
    pub display_name: String,
}

impl AuthenticatedUser {
    pub fn from_email(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            display_name: display_name_from_email(&email),
            email,
        }
    }
}

/// An active sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthenticatedUser,
    pub last_login: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn start(user: AuthenticatedUser, now: DateTime<Utc>) -> Self {
        Self {
            user,
            last_login: now,
            expires_at: session_expiry(now),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Email one-time-code identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sends a 6-digit code to `email`.
    async fn request_code(&self, email: &str) -> Result<(), AuthError>;

    /// Exchanges a code for a session.
    async fn verify_code(&self, email: &str, code: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Returns the active session, if any and not expired.
    async fn current_session(&self) -> Option<AuthSession>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}
