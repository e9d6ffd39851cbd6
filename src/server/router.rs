use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health, metrics};
use crate::server::middleware::track_metrics;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(chat::index))
        .route("/get", post(chat::get_answer))
        .route("/metrics", get(metrics::metrics))
        .route("/health", get(health::health))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
