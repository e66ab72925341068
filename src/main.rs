// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use stylenest_dashboard::application::dashboard_service::DashboardService;
use stylenest_dashboard::application::dataset_cache::DatasetCache;
use stylenest_dashboard::infrastructure::config::{load_app_config, load_role_layouts};
use stylenest_dashboard::infrastructure::fs_dataset_store::FsDatasetStore;
use stylenest_dashboard::presentation::app_state::AppState;
use stylenest_dashboard::presentation::router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let layouts = load_role_layouts(&app_config.layouts.path)
        .with_context(|| format!("loading role layouts from {}", app_config.layouts.path))?;

    // Create dataset store and cache (infrastructure + application layers)
    let store = Arc::new(FsDatasetStore::new(app_config.data.dir.clone()));
    let cache = Arc::new(DatasetCache::new(store));

    // Create services (application layer)
    let dashboard_service = DashboardService::new(cache, Arc::new(layouts));

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let router = router(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", app_config.server.bind))?;
    tracing::info!(
        data_dir = %app_config.data.dir.display(),
        "Starting stylenest-dashboard on {}",
        addr
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
