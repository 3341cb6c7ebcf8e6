/// Authentication endpoints
///
/// This module provides account endpoints:
/// - Signup (creates an unverified account and mails a verification link)
/// - Login / logout
/// - Email verification and resending the verification mail
///
/// # Endpoints
///
/// - `POST /v1/auth/signup` - Register new user
/// - `POST /v1/auth/login` - Login and get a session token
/// - `POST /v1/auth/logout` - End the current session
/// - `GET /v1/auth/verify/:token` - Complete email verification
/// - `POST /v1/auth/verify` - Resend the verification mail

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ApiJson, ApiResponse},
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use taskpro_shared::auth::middleware::bearer_token;
use taskpro_shared::identity::{Identity, LoginCredentials, Registration};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Resend verification request
#[derive(Debug, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    /// Email the account was registered with
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Wraps the public identity
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Identity,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token for the `Authorization: Bearer` header
    pub token: String,

    /// Token expiry, milliseconds since the Unix epoch
    #[serde(rename = "tokenValability")]
    pub expires_at: i64,

    /// Logged-in user
    pub user: Identity,
}

/// Plain confirmation
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/signup
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "secret", "name": "Ada" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "success",
///   "code": 201,
///   "data": { "user": { "email": "user@example.com", "name": "Ada", "avatar": "https://..." } }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<ApiResponse<UserResponse>> {
    req.validate()?;

    let user = state
        .identity
        .register(Registration {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok(ApiResponse::created(UserResponse { user }))
}

/// Login with email and password
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Wrong credentials, or the email is not verified yet
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    req.validate()?;

    let outcome = state
        .identity
        .authenticate(LoginCredentials {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        user: outcome.identity,
    }))
}

/// End the session in the `Authorization` header
///
/// Answers `204 No Content`.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))?;

    state.identity.end_session(token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Complete verification with the token from the mailed link
///
/// # Errors
///
/// - `404 Not Found`: No account holds the token
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<ApiResponse<MessageResponse>> {
    state.identity.verify(&token).await?;

    Ok(ApiResponse::ok(MessageResponse {
        message: "Verification successful".to_string(),
    }))
}

/// Resend the verification mail
///
/// # Errors
///
/// - `400 Bad Request`: Missing email, or the account is already verified
/// - `404 Not Found`: Unknown email
pub async fn resend_verification(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResendVerificationRequest>,
) -> ApiResult<ApiResponse<MessageResponse>> {
    req.validate()?;

    state.identity.resend_verification(&req.email).await?;

    Ok(ApiResponse::ok(MessageResponse {
        message: "Verification email sent".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
            name: "Ada".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = SignupRequest {
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
            name: String::new(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_login_response_uses_client_field_names() {
        let response = LoginResponse {
            token: "t".to_string(),
            expires_at: 1_700_000_000_000,
            user: Identity {
                email: "user@example.com".to_string(),
                name: "Ada".to_string(),
                avatar: "https://example.com/a.png".to_string(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tokenValability"], 1_700_000_000_000_i64);
        assert_eq!(json["user"]["avatar"], "https://example.com/a.png");
    }
}
