/// Background image catalog
///
/// Read-only; rows are seeded by migration.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Selectable board background
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImage {
    pub id: Uuid,
    pub name: String,
    pub img_url: String,
}

impl BackgroundImage {
    /// Lists the catalog ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BackgroundImage>(
            "SELECT id, name, img_url FROM background_images ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }
}
