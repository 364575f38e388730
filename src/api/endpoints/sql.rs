//! Read-only SQL console endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{SqlQueryPayload, SqlQueryResult};

/// `POST /api/sql-demo`: guarded `SELECT` on a read-only connection.
pub async fn run(
    State(ctx): State<ApiContext>,
    ApiJson(payload): ApiJson<SqlQueryPayload>,
) -> Result<Json<SqlQueryResult>, ApiError> {
    let conn = ctx.open_read_only()?;
    Ok(Json(db::run_read_only_query(&conn, &payload.query, ctx.sql_row_cap)?))
}
