use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order operations by outcome (ok, forbidden, blocked, ...)
// - Operation latency
// - Orders created
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the service
pub struct Metrics {
    registry: Registry,

    pub order_operations: IntCounterVec,
    pub order_operation_duration: HistogramVec,
    pub orders_created: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let order_operations = IntCounterVec::new(
            Opts::new("order_operations_total", "Order operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(order_operations.clone()))?;

        let order_operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Order operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(order_operation_duration.clone()))?;

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        Ok(Self {
            registry,
            order_operations,
            order_operation_duration,
            orders_created,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record one finished operation. `outcome` is "ok" or an error kind.
    pub fn record_operation(&self, operation: &str, outcome: &str, duration_secs: f64) {
        self.order_operations.with_label_values(&[operation, outcome]).inc();
        self.order_operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_order_created(&self) {
        self.orders_created.inc();
    }
}
