//! Session-based authentication
//!
//! A session is a server-side record binding an opaque token to a user id.
//! [`SessionAuthenticator`] moves a caller between `Anonymous` and
//! `Authenticated(user_id)`:
//!
//! - `login` verifies credentials and opens a session
//! - `logout` drops the session, whatever state the caller was in
//! - `current_identity` resolves the token carried by a request

use crate::core::auth::Identity;
use crate::core::entry::{User, UserId};
use crate::core::error::{AuthError, BlogError};
use crate::core::service::{PasswordVerifier, SessionStore, UserRepository};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque session token carried in the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A live binding between a token and a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Open a session lasting `ttl` from now
    ///
    /// Fails when the expiry is not representable.
    pub fn new(user_id: UserId, ttl: Duration) -> anyhow::Result<Self> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| anyhow::anyhow!("Session lifetime of {}s overflows", ttl.num_seconds()))?;
        Ok(Self {
            token: SessionToken::generate(),
            user_id,
            created_at: now,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn identity(&self) -> Identity {
        Identity::authenticated(self.user_id)
    }
}

/// Verifies credentials and manages the session lifecycle
///
/// No lockout or rate limiting is applied to repeated failures.
pub struct SessionAuthenticator {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    verifier: Arc<dyn PasswordVerifier>,
    ttl: Duration,
}

impl SessionAuthenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        verifier: Arc<dyn PasswordVerifier>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            verifier,
            ttl,
        }
    }

    /// Verify `email`/`password` and open a session
    ///
    /// The email must match exactly. A missing user and a wrong password both
    /// produce [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, BlogError> {
        let user = self.users.find_by_email(email).await?;

        let user = match user {
            Some(user) if self.verifier.verify(password, &user.password_hash) => user,
            _ => {
                tracing::warn!("login failed");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let session = self.sessions.create(user.id, self.ttl).await?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(session)
    }

    /// Drop the session behind `token`, if any
    ///
    /// Always ends anonymous; calling it without a session is a no-op.
    pub async fn logout(&self, token: Option<&SessionToken>) -> Result<Identity, BlogError> {
        if let Some(token) = token {
            if let Some(session) = self.sessions.resolve(token).await? {
                tracing::info!(user_id = %session.user_id, "user logged out");
            }
            self.sessions.destroy(token).await?;
        }
        Ok(Identity::Anonymous)
    }

    /// Identity bound to `token`
    pub async fn current_identity(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<Identity, BlogError> {
        Ok(self
            .current_user(token)
            .await?
            .map(|user| Identity::authenticated(user.id))
            .unwrap_or_default())
    }

    /// User bound to `token`
    ///
    /// A session whose user has vanished resolves as anonymous.
    pub async fn current_user(&self, token: Option<&SessionToken>) -> Result<Option<User>, BlogError> {
        let Some(token) = token else {
            return Ok(None);
        };
        let Some(session) = self.sessions.resolve(token).await? else {
            return Ok(None);
        };
        Ok(self.users.get(&session.user_id).await?)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
