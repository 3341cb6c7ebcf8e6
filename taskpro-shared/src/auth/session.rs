/// Session issuing, verification and revocation
///
/// A session is a signed JWT plus the absence of its `jti` from the
/// revocation list. [`SessionManager`] is the only place that combines the
/// two checks.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use super::jwt::{create_token, validate_token, Claims};
use super::revocation::RevocationList;
use crate::error::{CoreError, CoreResult};

/// Freshly issued session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Signed token to hand to the client
    pub token: String,

    /// Session ID (`jti`)
    pub session_id: Uuid,

    /// Expiry in milliseconds since the Unix epoch
    pub expires_at: i64,
}

/// Issues and checks session tokens
#[derive(Clone)]
pub struct SessionManager {
    secret: Arc<str>,
    ttl: Duration,
    revocations: RevocationList,
}

impl SessionManager {
    pub fn new(secret: impl Into<String>, ttl: Duration, revocations: RevocationList) -> Self {
        let secret: String = secret.into();
        Self {
            secret: Arc::from(secret),
            ttl,
            revocations,
        }
    }

    /// Signs a new session for `user_id`
    pub fn issue(&self, user_id: Uuid) -> CoreResult<IssuedSession> {
        let claims = Claims::with_expiration(user_id, self.ttl);
        let token = create_token(&claims, &self.secret)?;

        Ok(IssuedSession {
            token,
            session_id: claims.jti,
            expires_at: claims.expires_at_millis(),
        })
    }

    /// Validates a token and rejects revoked sessions
    ///
    /// # Errors
    ///
    /// `Auth("Token expired")`, `Auth("Invalid token")` or
    /// `Auth("Session has ended")`; `Upstream` if Redis can't be reached.
    pub async fn verify(&self, token: &str) -> CoreResult<Claims> {
        let claims = validate_token(token, &self.secret)?;

        if self.revocations.is_revoked(claims.jti).await? {
            return Err(CoreError::Auth("Session has ended".to_string()));
        }

        Ok(claims)
    }

    /// Revokes a session until its natural expiry
    pub async fn revoke(&self, session_id: Uuid, expires_at_secs: i64) -> CoreResult<()> {
        let remaining = expires_at_secs - chrono::Utc::now().timestamp();
        if remaining <= 0 {
            return Ok(());
        }

        self.revocations
            .revoke(session_id, remaining as u64)
            .await?;

        tracing::debug!(session_id = %session_id, ttl_secs = remaining, "Session revoked");
        Ok(())
    }
}
