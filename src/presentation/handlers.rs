// HTTP request handlers
use crate::domain::error::DashboardError;
use crate::domain::role::Role;
use crate::infrastructure::http_response::{accepts_brotli, error_response, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the role dashboards available
pub async fn list_roles(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let roles = state.dashboard_service.list_roles();
    respond(&roles, accepts_brotli(&headers)).await
}

/// Render the dashboard view model for one role
pub async fn get_dashboard(
    Path(role): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let compress = accepts_brotli(&headers);

    let role: Role = match role.parse() {
        Ok(role) => role,
        Err(e) => return error_response(&DashboardError::from(e)).await,
    };

    // The pipeline is synchronous and may read from disk on a cache miss
    let service = state.dashboard_service.clone();
    match tokio::task::spawn_blocking(move || service.render(role)).await {
        Ok(Ok(view)) => respond(&view, compress).await,
        Ok(Err(e)) => {
            tracing::error!(role = role.slug(), "Error rendering dashboard: {}", e);
            error_response(&e).await
        }
        Err(e) => {
            tracing::error!(role = role.slug(), "Render task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Cache status of every known dataset
pub async fn list_datasets(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let status = state.dashboard_service.cache_status();
    respond(&status, accepts_brotli(&headers)).await
}

/// A dataset document, serialized back from its parsed form
pub async fn get_dataset(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let compress = accepts_brotli(&headers);

    let service = state.dashboard_service.clone();
    let lookup = name.clone();
    match tokio::task::spawn_blocking(move || service.dataset(&lookup)).await {
        Ok(Ok(dataset)) => respond(dataset.document(), compress).await,
        Ok(Err(e)) => {
            tracing::warn!(dataset = %name, "Error loading dataset: {}", e);
            error_response(&e).await
        }
        Err(e) => {
            tracing::error!(dataset = %name, "Dataset task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn respond<T: Serialize>(data: &T, compress: bool) -> Response<Body> {
    match json_response(data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
