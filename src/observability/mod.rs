// Structured logging
pub mod logging;

// Prometheus metrics
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::install_prometheus;
