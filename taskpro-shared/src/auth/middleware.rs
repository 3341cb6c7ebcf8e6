/// Request authentication helpers for Axum
///
/// The API's auth layer calls [`authenticate`] and stores the resulting
/// [`AuthContext`] in the request extensions. Handlers read it back with
/// Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskpro_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::SessionManager;
use crate::error::{CoreError, CoreResult};

/// Authenticated session attached to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Session ID (`jti`)
    pub session_id: Uuid,

    /// Token expiry (Unix seconds)
    pub expires_at: i64,
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the request's bearer token into an [`AuthContext`]
///
/// # Errors
///
/// `Auth` if the header is missing, the token is invalid or expired, or the
/// session was ended; `Upstream` if the revocation list is unreachable.
pub async fn authenticate(sessions: &SessionManager, headers: &HeaderMap) -> CoreResult<AuthContext> {
    let token = bearer_token(headers)
        .ok_or_else(|| CoreError::Auth("Not authorized".to_string()))?;

    let claims = sessions.verify(token).await?;

    Ok(AuthContext {
        user_id: claims.sub,
        session_id: claims.jti,
        expires_at: claims.exp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());
    }
}
