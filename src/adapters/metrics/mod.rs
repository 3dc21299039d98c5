//! Metrics Adapter - Prometheus Export

pub mod prometheus;

pub use prometheus::MetricsRegistry;
