//! Prometheus metrics emitted by this node core.

use prometheus::{Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use thiserror::Error;

/// Errors registering a metric with the process-wide [`Registry`].
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A metric with a colliding name was already registered.
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
}

/// Every metric this node core emits, bundled with the registry they are
/// registered against. Constructed once at startup and shared via `Arc`.
pub struct NodeMetrics {
    /// The registry callers should expose on the metrics HTTP endpoint.
    pub registry: Registry,
    /// Wall-clock seconds spent producing a block, start to broadcast.
    pub block_production_seconds: Histogram,
    /// `local_height - best_peer_height` as last observed; zero or
    /// negative when caught up.
    pub sync_lag_blocks: IntGauge,
    /// Seconds since the last checkpoint was generated or applied.
    pub checkpoint_age_seconds: Gauge,
    /// Currently connected, alive peers.
    pub peer_count: IntGauge,
    /// Blocks rejected by validation, cumulative.
    pub blocks_rejected_total: IntCounter,
    /// Reorgs performed, cumulative.
    pub reorgs_total: IntCounter,
    /// Confiscations executed, cumulative.
    pub confiscations_total: IntCounter,
}

impl NodeMetrics {
    /// Build and register every metric against a fresh [`Registry`].
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let block_production_seconds = Histogram::with_opts(HistogramOpts::new(
            "block_production_seconds",
            "Time spent producing a block, from wait-elect to broadcast.",
        ))?;
        let sync_lag_blocks =
            IntGauge::new("sync_lag_blocks", "Local height minus best peer height.")?;
        let checkpoint_age_seconds = Gauge::new(
            "checkpoint_age_seconds",
            "Seconds since the last checkpoint was generated or applied.",
        )?;
        let peer_count = IntGauge::new("peer_count", "Currently connected, alive peers.")?;
        let blocks_rejected_total =
            IntCounter::new("blocks_rejected_total", "Blocks rejected by validation.")?;
        let reorgs_total = IntCounter::new("reorgs_total", "Reorganizations performed.")?;
        let confiscations_total =
            IntCounter::new("confiscations_total", "Confiscations executed.")?;

        registry.register(Box::new(block_production_seconds.clone()))?;
        registry.register(Box::new(sync_lag_blocks.clone()))?;
        registry.register(Box::new(checkpoint_age_seconds.clone()))?;
        registry.register(Box::new(peer_count.clone()))?;
        registry.register(Box::new(blocks_rejected_total.clone()))?;
        registry.register(Box::new(reorgs_total.clone()))?;
        registry.register(Box::new(confiscations_total.clone()))?;

        Ok(Self {
            registry,
            block_production_seconds,
            sync_lag_blocks,
            checkpoint_age_seconds,
            peer_count,
            blocks_rejected_total,
            reorgs_total,
            confiscations_total,
        })
    }
}
