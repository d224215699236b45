//! Route builders. `app_router` assembles the full service.

pub mod common;
pub mod forms;

pub use common::common_routes;
pub use forms::admin_routes;

use crate::config::AppConfig;
use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Health routes at the root, admin API under `/api/admin`, bodies capped at `config.body_limit_bytes`.
pub fn app_router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/admin", admin_routes(state))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(config.body_limit_bytes)))
}
