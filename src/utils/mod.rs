//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Thread-safe observability counters

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{global_metrics, Metrics, MetricsSnapshot, Timer};
