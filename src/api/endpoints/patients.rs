//! Patient registration endpoints.

use axum::extract::{Path, State};
use axum::Json;

use super::StatusResponse;
use crate::api::error::{ApiError, ApiJson};
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{Patient, PatientInput, PatientUpdate};

/// `GET /api/patients`: newest registrations first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::list_patients(&conn)?))
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(input): ApiJson<PatientInput>,
) -> Result<Json<Patient>, ApiError> {
    let record = input.validate()?;
    let conn = ctx.open_db()?;
    let patient = db::insert_patient(&conn, &record)?;
    tracing::info!(patient_id = patient.patient_id, "Patient registered");
    Ok(Json(patient))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::get_patient(&conn, id)?))
}

/// `PUT /api/patients/:id`: partial update.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<PatientUpdate>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::update_patient(&conn, id, &update)?))
}

/// `DELETE /api/patients/:id`: refused with 409 while orders exist.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    let conn = ctx.open_db()?;
    db::delete_patient(&conn, id)?;
    tracing::info!(patient_id = id, "Patient deleted");
    Ok(Json(StatusResponse::ok()))
}
