//! Metrics module - performance figures and history series.

mod metrics_model;
mod metrics_service;


pub use metrics_model::{AssetMetrics, HistoryPoint, HistoryRange};
pub use metrics_service::{
    build_history, compute_metrics, preview_value, MetricsService, MetricsServiceTrait,
};
