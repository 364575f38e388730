//! Activity feed endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::ActivityLogItem;

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// `GET /api/activity?limit=N`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityLogItem>>, ApiError> {
    let conn = ctx.open_db()?;
    let limit = db::clamp_activity_limit(query.limit);
    Ok(Json(db::list_activity(&conn, limit)?))
}
