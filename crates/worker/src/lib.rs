//! Click pipeline for the banner counter.
//!
//! Producers call [`ClickService::register_click`], which checks the banner
//! and pushes an event into the bounded intake queue. A single
//! [`ClickAggregator`] task merges events into the aggregation bucket and
//! flushes it to storage on a timer, once more on shutdown.

pub mod aggregation;
pub mod aggregator;
pub mod config;
pub mod flush;
pub mod intake;
pub mod lifecycle;
pub mod service;

#[cfg(test)]
mod testing;

pub use aggregation::AggregationBucket;
pub use aggregator::{AggregatorReport, AggregatorState, ClickAggregator};
pub use config::PipelineConfig;
pub use flush::{FlushCoordinator, FlushOutcome, FlushPolicy};
pub use intake::{intake_queue, IntakeQueue, IntakeReceiver};
pub use lifecycle::ClickPipeline;
pub use service::ClickService;
