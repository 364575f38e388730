//! Doctor directory endpoints.

use axum::extract::State;
use axum::Json;

use crate::api::error::{ApiError, ApiJson};
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{Doctor, DoctorInput};

/// `GET /api/doctors`: ordered by name.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Doctor>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::list_doctors(&conn)?))
}

/// `POST /api/doctors`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(input): ApiJson<DoctorInput>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::insert_doctor(&conn, &input)?))
}
