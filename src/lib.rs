//! Role-based business intelligence dashboards.
//!
//! Static JSON datasets are loaded once per process, aggregated into a few
//! derived metrics and assembled into a per-role view model (KPI cards,
//! chart series, table rows) that a front end renders.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
