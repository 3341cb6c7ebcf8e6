/// Card endpoints
///
/// - `POST /v1/columns/:id/cards` - Append a card to a column
/// - `PATCH /v1/cards/:id` - Edit title / description / label color / deadline
/// - `DELETE /v1/cards/:id` - Delete a card
/// - `PATCH /v1/cards/:id/move/:column_id` - Move a card to a column
///
/// A move takes an optional `?position=n` query; without it the card goes to
/// the end of the destination column.

use crate::{
    app::AppState,
    error::ApiResult,
    response::{ApiJson, ApiPath, ApiQuery, ApiResponse},
    routes::boards::DeletedResponse,
};
use axum::{extract::State, Extension};
use serde::Deserialize;
use taskpro_shared::auth::middleware::AuthContext;
use taskpro_shared::hierarchy::{CardChanges, MovedCard, NewCard};
use taskpro_shared::models::card::Card;
use uuid::Uuid;
use validator::Validate;

/// Create card request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Free-form label color, e.g. "#FF0000"
    #[serde(default)]
    #[validate(length(max = 32, message = "Label color must be at most 32 characters"))]
    pub label_color: Option<String>,

    /// Date-like string, stored as given
    #[serde(default)]
    #[validate(length(max = 64, message = "Deadline must be at most 64 characters"))]
    pub deadline: Option<String>,
}

/// Update card request; absent fields are left alone
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 32, message = "Label color must be at most 32 characters"))]
    pub label_color: Option<String>,

    #[serde(default)]
    #[validate(length(max = 64, message = "Deadline must be at most 64 characters"))]
    pub deadline: Option<String>,
}

/// Move query
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MoveCardQuery {
    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
}

/// Append a card
///
/// # Errors
///
/// - `400 Bad Request`: Missing title
/// - `404 Not Found`: No such column for this user
pub async fn create_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateCardRequest>,
) -> ApiResult<ApiResponse<Card>> {
    req.validate()?;

    let card = state
        .hierarchy
        .create_card(
            auth.user_id,
            column_id,
            NewCard {
                title: req.title,
                description: req.description,
                label_color: req.label_color,
                deadline: req.deadline,
            },
        )
        .await?;

    Ok(ApiResponse::created(card))
}

/// Edit a card
pub async fn update_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(card_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateCardRequest>,
) -> ApiResult<ApiResponse<Card>> {
    req.validate()?;

    let card = state
        .hierarchy
        .update_card(
            auth.user_id,
            card_id,
            CardChanges {
                title: req.title,
                description: req.description,
                label_color: req.label_color,
                deadline: req.deadline,
            },
        )
        .await?;

    Ok(ApiResponse::ok(card))
}

/// Delete a card
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(card_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<DeletedResponse>> {
    state.hierarchy.delete_card(auth.user_id, card_id).await?;
    Ok(ApiResponse::ok(DeletedResponse { id: card_id }))
}

/// Move a card
///
/// Answers with the moved card plus the old and new column ids.
///
/// # Errors
///
/// - `404 Not Found`: The card or the destination column isn't the user's
pub async fn move_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((card_id, column_id)): ApiPath<(Uuid, Uuid)>,
    ApiQuery(query): ApiQuery<MoveCardQuery>,
) -> ApiResult<ApiResponse<MovedCard>> {
    query.validate()?;

    let moved = state
        .hierarchy
        .move_card(auth.user_id, card_id, column_id, query.position)
        .await?;

    Ok(ApiResponse::ok(moved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_camel_case() {
        let req: CreateCardRequest = serde_json::from_value(json!({
            "title": "Fix bug",
            "labelColor": "#FF0000",
            "deadline": "2024-12-31"
        }))
        .unwrap();

        assert_eq!(req.label_color.as_deref(), Some("#FF0000"));
        assert_eq!(req.description, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_requires_title() {
        let req: CreateCardRequest = serde_json::from_value(json!({ "title": "" })).unwrap();
        assert!(req.validate().is_err());

        assert!(serde_json::from_value::<CreateCardRequest>(json!({})).is_err());
    }

    #[test]
    fn test_move_query_position() {
        assert!(MoveCardQuery::default().validate().is_ok());
        assert!(MoveCardQuery { position: Some(-1) }.validate().is_err());
    }
}
