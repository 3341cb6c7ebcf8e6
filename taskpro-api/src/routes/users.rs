/// Current user endpoints
///
/// - `GET /v1/users/current` - Public profile of the session's user
/// - `PATCH /v1/users/current` - Update name, email, password and/or avatar
///
/// Updates are `multipart/form-data` so the avatar can travel with the text
/// fields. Unknown parts are ignored; empty text parts count as absent.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::UserResponse,
    response::ApiResponse,
};
use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
};
use taskpro_shared::assets::AssetUpload;
use taskpro_shared::auth::middleware::bearer_token;
use taskpro_shared::identity::ProfileUpdate;

fn session_token(headers: &HeaderMap) -> ApiResult<&str> {
    bearer_token(headers).ok_or_else(|| ApiError::Unauthorized("Not authorized".to_string()))
}

/// Get the current user
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid, expired or ended session
/// - `404 Not Found`: The account no longer exists
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ApiResponse<UserResponse>> {
    let token = session_token(&headers)?;
    let user = state.identity.current_identity(token).await?;

    Ok(ApiResponse::ok(UserResponse { user }))
}

/// Update the current user
///
/// # Form fields
///
/// - `name`, `email`, `password`: text, optional
/// - `avatar`: file, optional
///
/// # Errors
///
/// - `400 Bad Request`: Malformed form or invalid field
/// - `401 Unauthorized`: Bad session
/// - `409 Conflict`: Email taken by another account
/// - `500 Internal Server Error`: Avatar storage failed
pub async fn update_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<ApiResponse<UserResponse>> {
    let token = session_token(&headers)?;
    let update = read_profile_form(multipart).await?;

    let user = state.identity.update_profile(token, update).await?;

    Ok(ApiResponse::ok(UserResponse { user }))
}

async fn read_profile_form(mut multipart: Multipart) -> ApiResult<ProfileUpdate> {
    let mut update = ProfileUpdate::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "avatar" => {
                let file_name = field.file_name().unwrap_or("avatar").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("File upload error: {}", e)))?;

                if !bytes.is_empty() {
                    update.avatar = Some(AssetUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            "name" | "email" | "password" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?;
                let value = non_empty(value);

                match name.as_str() {
                    "name" => update.name = value,
                    "email" => update.email = value,
                    _ => update.password = value,
                }
            }
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(update)
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("Ada".to_string()), Some("Ada".to_string()));
        assert_eq!(non_empty("   ".to_string()), None);
    }

    #[test]
    fn test_session_token_required() {
        let mut headers = HeaderMap::new();
        assert!(matches!(session_token(&headers), Err(ApiError::Unauthorized(_))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(session_token(&headers).unwrap(), "abc");
    }
}
