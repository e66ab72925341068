// Application layer - the load → aggregate → build pipeline
pub mod dashboard_service;
pub mod dataset_cache;
pub mod dataset_store;
pub mod metrics;
pub mod view_model_builder;
