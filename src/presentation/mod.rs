// Presentation layer - HTTP routes over the dashboard service
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_dashboard, get_dataset, health_check, list_datasets, list_roles,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/roles", get(list_roles))
        .route("/dashboards/:role", get(get_dashboard))
        .route("/datasets", get(list_datasets))
        .route("/datasets/:name", get(get_dataset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
