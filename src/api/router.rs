//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost): CORS → access log → handler.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::remove),
        )
        .route(
            "/doctors",
            get(endpoints::doctors::list).post(endpoints::doctors::create),
        )
        .route(
            "/tests",
            get(endpoints::tests::list).post(endpoints::tests::create),
        )
        .route("/test-categories", get(endpoints::tests::categories))
        .route(
            "/orders",
            get(endpoints::orders::list).post(endpoints::orders::create),
        )
        .route(
            "/orders/:id",
            get(endpoints::orders::detail).put(endpoints::orders::update),
        )
        .route("/orders/:id/results", put(endpoints::orders::results))
        .route("/reports", get(endpoints::reports::list))
        .route("/reports/:id/pdf", get(endpoints::reports::pdf))
        .route("/dashboard", get(endpoints::dashboard::stats))
        .route("/activity", get(endpoints::activity::list))
        .route(
            "/settings",
            get(endpoints::settings::get).put(endpoints::settings::update),
        )
        .route("/sql-demo", post(endpoints::sql::run))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(axum::middleware::from_fn(middleware::access::log_access))
        .layer(CorsLayer::permissive())
}
