use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, monitors};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let monitor_routes = Router::new()
        .route(
            "/monitors",
            get(monitors::list_monitors).post(monitors::create_monitor),
        )
        .route("/monitors/run", post(monitors::run_monitors))
        .route("/monitors/{id}", delete(monitors::delete_monitor));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(monitor_routes)
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
