//! # Quantum Telemetry
//!
//! Structured logging initialization and the Prometheus metrics this node
//! core emits: block production latency, sync lag, checkpoint age, and
//! peer count.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::NodeMetrics;
