/// Column endpoints
///
/// - `POST /v1/boards/:id/columns` - Append a column to a board
/// - `PATCH /v1/columns/:id` - Rename a column
/// - `DELETE /v1/columns/:id` - Delete a column and its cards
/// - `PATCH /v1/columns/:id/position` - Move a column within its board

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiJson, ApiPath, ApiResponse},
    routes::boards::DeletedResponse,
};
use axum::{extract::State, Extension};
use serde::Deserialize;
use taskpro_shared::auth::middleware::AuthContext;
use taskpro_shared::hierarchy::{BoardView, ColumnChanges, ColumnView, NewColumn};
use taskpro_shared::models::column::Column;
use uuid::Uuid;
use validator::Validate;

/// Create or rename column request
#[derive(Debug, Deserialize, Validate)]
pub struct ColumnRequest {
    /// Column name, unique per board
    #[serde(alias = "columnName")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Reorder request
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderColumnRequest {
    /// Target index; clamped to the board's column range
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: i32,
}

/// Append a column
///
/// # Errors
///
/// - `404 Not Found`: No such board for this user
/// - `409 Conflict`: The board already has a column with that name
pub async fn create_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ColumnRequest>,
) -> ApiResult<ApiResponse<ColumnView>> {
    req.validate()?;

    let column = state
        .hierarchy
        .create_column(auth.user_id, board_id, NewColumn { name: req.name })
        .await?;

    Ok(ApiResponse::created(column))
}

/// Rename a column
pub async fn update_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ColumnRequest>,
) -> ApiResult<ApiResponse<Column>> {
    req.validate()?;

    let column = state
        .hierarchy
        .update_column(auth.user_id, column_id, ColumnChanges { name: req.name })
        .await?;

    Ok(ApiResponse::ok(column))
}

/// Delete a column
pub async fn delete_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(column_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<DeletedResponse>> {
    state.hierarchy.delete_column(auth.user_id, column_id).await?;
    Ok(ApiResponse::ok(DeletedResponse { id: column_id }))
}

/// Move a column; answers with the reordered board
pub async fn reorder_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReorderColumnRequest>,
) -> ApiResult<ApiResponse<BoardView>> {
    req.validate()?;

    let board = state
        .hierarchy
        .reorder_column(auth.user_id, column_id, req.position)
        .await?;

    Ok(ApiResponse::ok(board))
}
