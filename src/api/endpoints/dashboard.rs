//! Dashboard statistics endpoint.

use axum::extract::State;
use axum::Json;

use super::today;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::DashboardResponse;

/// `GET /api/dashboard`
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<DashboardResponse>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::dashboard(&conn, today())?))
}
