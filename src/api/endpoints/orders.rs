//! Test order endpoints: creation, detail, updates and result entry.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{today, StatusResponse};
use crate::api::error::{ApiError, ApiJson};
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{
    CreateOrderPayload, CreatedOrder, DisplayStatus, OrderDetail, OrderListItem, ResultsUpdate,
    UpdateOrderPayload, UpdateResultsPayload,
};

/// `GET /api/orders`: newest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<OrderListItem>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::list_orders(&conn)?))
}

/// `POST /api/orders`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(payload): ApiJson<CreateOrderPayload>,
) -> Result<Json<CreatedOrder>, ApiError> {
    let conn = ctx.open_db()?;
    let created = db::create_order(&conn, &payload, today())?;
    tracing::info!(order_id = created.order_id, "Order created");
    Ok(Json(created))
}

/// `GET /api/orders/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetail>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::get_order_detail(&conn, id)?))
}

/// `PUT /api/orders/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateOrderPayload>,
) -> Result<Json<StatusResponse>, ApiError> {
    let conn = ctx.open_db()?;
    db::update_order(&conn, id, &payload)?;
    Ok(Json(StatusResponse::ok()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub status: String,
    pub message: String,
    pub updated: usize,
    pub skipped: Vec<i64>,
    pub order_status: DisplayStatus,
}

impl From<ResultsUpdate> for ResultsResponse {
    fn from(outcome: ResultsUpdate) -> Self {
        Self {
            status: "ok".into(),
            message: "Results updated successfully".into(),
            updated: outcome.updated,
            skipped: outcome.skipped,
            order_status: outcome.status,
        }
    }
}

/// `PUT /api/orders/:id/results`
pub async fn results(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateResultsPayload>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let outcome = db::record_results(&conn, id, &payload, today())?;
    Ok(Json(outcome.into()))
}
