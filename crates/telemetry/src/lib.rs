//! Telemetry for the click counter.
//!
//! Metrics stay in-process and are logged when the service stops;
//! structured logs go through `tracing`.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
