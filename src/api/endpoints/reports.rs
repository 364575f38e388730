//! Completed reports and their printable PDF.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::today;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::ReportListItem;
use crate::report::ReportDocument;

/// `GET /api/reports`: orders with status `REPORT_READY`.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<ReportListItem>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::list_reports(&conn)?))
}

/// `GET /api/reports/:id/pdf`: any order can be printed; results not
/// yet entered show as `-`.
pub async fn pdf(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let detail = db::get_order_detail(&conn, id)?;
    let settings = db::get_settings(&conn)?;

    let document = ReportDocument::build(&detail, &settings, today());
    let bytes = document
        .render_pdf()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::debug!(
        order_id = id,
        abnormal = document.flagged().count(),
        bytes = bytes.len(),
        "Rendered report"
    );

    let disposition = format!("inline; filename=\"{}\"", document.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
