//! Lab settings endpoints.

use axum::extract::State;
use axum::Json;

use super::StatusResponse;
use crate::api::error::{ApiError, ApiJson};
use crate::api::types::ApiContext;
use crate::db;
use crate::models::LabSettings;

/// `GET /api/settings`
pub async fn get(State(ctx): State<ApiContext>) -> Result<Json<LabSettings>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::get_settings(&conn)?))
}

/// `PUT /api/settings`: upsert every key in the body.
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiJson(update): ApiJson<LabSettings>,
) -> Result<Json<StatusResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let stored = db::update_settings(&conn, &update)?;
    tracing::info!(keys = stored.settings.len(), "Settings updated");
    Ok(Json(StatusResponse::ok()))
}
