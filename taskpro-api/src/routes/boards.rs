/// Board endpoints
///
/// All routes require a session. Boards are returned fully hydrated: each
/// board carries its columns in order, and each column its cards in order.
///
/// # Endpoints
///
/// - `GET /v1/boards` - List the user's boards
/// - `POST /v1/boards` - Create a board
/// - `GET /v1/boards/:id` - Get one board
/// - `PATCH /v1/boards/:id` - Rename / change icon / change background
/// - `DELETE /v1/boards/:id` - Delete a board with its columns and cards

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiJson, ApiPath, ApiResponse},
};
use axum::{extract::State, Extension};
use serde::{Deserialize, Deserializer, Serialize};
use taskpro_shared::auth::middleware::AuthContext;
use taskpro_shared::hierarchy::{BoardChanges, BoardView, NewBoard};
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board name, unique per user
    #[serde(alias = "boardName")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Icon reference
    #[serde(default)]
    #[validate(length(max = 255, message = "Icon must be at most 255 characters"))]
    pub icon: String,

    /// Background reference
    #[serde(default)]
    #[validate(length(max = 1024, message = "Background must be at most 1024 characters"))]
    pub background: Option<String>,
}

/// Update board request; absent fields are left alone
///
/// `"background": null` clears the background.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[serde(default, alias = "boardName")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 255, message = "Icon must be at most 255 characters"))]
    pub icon: Option<String>,

    #[serde(default, deserialize_with = "present_or_null")]
    pub background: Option<Option<String>>,
}

/// Distinguishes `"field": null` (Some(None)) from a missing field (None)
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Id of a deleted entity
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

/// List the user's boards
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<Vec<BoardView>>> {
    let boards = state.hierarchy.list_boards(auth.user_id).await?;
    Ok(ApiResponse::ok(boards))
}

/// Create a board
///
/// # Errors
///
/// - `400 Bad Request`: Missing name
/// - `409 Conflict`: The user already has a board with that name
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateBoardRequest>,
) -> ApiResult<ApiResponse<BoardView>> {
    req.validate()?;

    let board = state
        .hierarchy
        .create_board(
            auth.user_id,
            NewBoard {
                name: req.name,
                icon: req.icon,
                background: req.background,
            },
        )
        .await?;

    Ok(ApiResponse::created(board))
}

/// Get one board
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<BoardView>> {
    let board = state.hierarchy.get_board(auth.user_id, board_id).await?;
    Ok(ApiResponse::ok(board))
}

/// Update a board
///
/// # Errors
///
/// - `404 Not Found`: No such board for this user
/// - `409 Conflict`: Renaming onto another board's name
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateBoardRequest>,
) -> ApiResult<ApiResponse<BoardView>> {
    req.validate()?;

    let board = state
        .hierarchy
        .update_board(
            auth.user_id,
            board_id,
            BoardChanges {
                name: req.name,
                icon: req.icon,
                background: req.background,
            },
        )
        .await?;

    Ok(ApiResponse::ok(board))
}

/// Delete a board
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<DeletedResponse>> {
    state.hierarchy.delete_board(auth.user_id, board_id).await?;
    Ok(ApiResponse::ok(DeletedResponse { id: board_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_accepts_board_name_alias() {
        let req: CreateBoardRequest =
            serde_json::from_value(json!({ "boardName": "Work", "icon": "i1" })).unwrap();
        assert_eq!(req.name, "Work");
        assert_eq!(req.background, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_background_null_vs_missing() {
        let missing: UpdateBoardRequest = serde_json::from_value(json!({ "icon": "i2" })).unwrap();
        assert_eq!(missing.background, None);

        let cleared: UpdateBoardRequest =
            serde_json::from_value(json!({ "background": null })).unwrap();
        assert_eq!(cleared.background, Some(None));

        let set: UpdateBoardRequest =
            serde_json::from_value(json!({ "background": "sky" })).unwrap();
        assert_eq!(set.background, Some(Some("sky".to_string())));
    }

    #[test]
    fn test_update_request_rejects_empty_name() {
        let req = UpdateBoardRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_oversized_background() {
        let req: CreateBoardRequest = serde_json::from_value(json!({
            "name": "Work",
            "background": "x".repeat(2000)
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("background"));
    }
}
