// Domain layer - datasets, metrics, view models and the error taxonomy
pub mod dataset;
pub mod error;
pub mod metric;
pub mod role;
pub mod schema;
pub mod view_model;
