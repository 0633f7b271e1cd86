use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, DashboardState};

pub fn dashboard_routes(config: Arc<AppConfig>) -> Router {
    dashboard_routes_with_state(DashboardState::new(config))
}

/// Same routes over an existing board, so the host can share it.
pub fn dashboard_routes_with_state(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/refresh", post(handlers::refresh_dashboard))
        .route("/rest-windows", get(handlers::get_rest_windows))
        .route("/workload", get(handlers::get_workload))
        .layer(middleware::from_fn(auth_middleware))
        .with_state(state)
}
