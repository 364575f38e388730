//! Test catalog endpoints.

use axum::extract::State;
use axum::Json;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{TestCategory, TestInput, TestItem};

/// `GET /api/tests`: active tests with per-gender range texts.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<TestItem>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::list_tests(&conn)?))
}

/// `POST /api/tests`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(input): ApiJson<TestInput>,
) -> Result<Json<TestItem>, ApiError> {
    let conn = ctx.open_db()?;
    let item = db::insert_test(&conn, &input)?;
    tracing::info!(test_id = item.test_id, "Test added to catalog");
    Ok(Json(item))
}

/// `GET /api/test-categories`
pub async fn categories(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<TestCategory>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::list_categories(&conn)?))
}
