//! Prometheus Metrics Registry - Dashboard Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards.
//! Covers merge throughput and latency, catalog size, source volumes,
//! and the export/chat endpoints.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};

/// Centralized Prometheus metrics for the dashboard.
///
/// All metrics follow the naming convention `profit_dash_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Total merge passes executed.
    pub merges_total: IntCounter,
    /// Merge pass duration (seconds).
    pub merge_duration_seconds: Histogram,
    /// Unified products after the latest merge.
    pub products_merged: IntGauge,
    /// Rows currently loaded per raw source.
    pub source_rows: IntGaugeVec,
    /// Report exports served.
    pub exports_total: IntCounter,
    /// Chat requests by outcome (ok / error / unavailable).
    pub chat_requests: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let merges_total = IntCounter::new(
            "profit_dash_merges_total",
            "Total merge passes executed",
        )?;

        let merge_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "profit_dash_merge_duration_seconds",
                "Merge pass duration in seconds",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;

        let products_merged = IntGauge::new(
            "profit_dash_products_merged",
            "Unified products after the latest merge",
        )?;

        let source_rows = IntGaugeVec::new(
            Opts::new(
                "profit_dash_source_rows",
                "Rows currently loaded per raw source",
            ),
            &["source"],
        )?;

        let exports_total = IntCounter::new(
            "profit_dash_exports_total",
            "CSV report exports served",
        )?;

        let chat_requests = IntCounterVec::new(
            Opts::new(
                "profit_dash_chat_requests_total",
                "Chat assistant requests by outcome",
            ),
            &["outcome"],
        )?;

        // Register all metrics
        registry.register(Box::new(merges_total.clone()))?;
        registry.register(Box::new(merge_duration_seconds.clone()))?;
        registry.register(Box::new(products_merged.clone()))?;
        registry.register(Box::new(source_rows.clone()))?;
        registry.register(Box::new(exports_total.clone()))?;
        registry.register(Box::new(chat_requests.clone()))?;

        Ok(Self {
            registry,
            merges_total,
            merge_duration_seconds,
            products_merged,
            source_rows,
            exports_total,
            chat_requests,
        })
    }

    /// Text-encodes the current metric families for `GET /metrics`.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_and_render() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.merges_total.inc();
        metrics.products_merged.set(42);
        metrics.source_rows.with_label_values(&["info"]).set(3);
        metrics.chat_requests.with_label_values(&["ok"]).inc();

        let text = metrics.render();
        assert!(text.contains("profit_dash_merges_total 1"));
        assert!(text.contains("profit_dash_products_merged 42"));
        assert!(text.contains("source=\"info\""));
    }
}
