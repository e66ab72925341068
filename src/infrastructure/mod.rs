// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod fs_dataset_store;
pub mod http_response;
