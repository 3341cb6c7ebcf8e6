/// Board background catalog
///
/// `GET /v1/backgrounds` lists the preset images a board can use. The catalog
/// is seeded by migration and read-only.

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::extract::State;
use taskpro_shared::error::CoreError;
use taskpro_shared::models::background::BackgroundImage;

/// List background images
pub async fn list_backgrounds(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<BackgroundImage>>> {
    let backgrounds = BackgroundImage::list(&state.db)
        .await
        .map_err(CoreError::from)?;

    Ok(ApiResponse::ok(backgrounds))
}
