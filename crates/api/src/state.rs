//! Application state shared across handlers.

use clicker_core::{StatsReader, StorageSink};
use std::sync::Arc;
use worker::{AggregationBucket, ClickPipeline, ClickService, PipelineConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Click registration (banner check + intake queue)
    pub clicks: ClickService,
    /// Stats and banner reads (ClickHouse in production, mock in tests)
    pub stats: Arc<dyn StatsReader>,
    /// Live aggregation bucket, for health reporting
    pub bucket: Arc<AggregationBucket>,
}

impl AppState {
    /// Wire handlers to a running pipeline.
    pub fn new(
        pipeline: &ClickPipeline,
        sink: Arc<dyn StorageSink>,
        stats: Arc<dyn StatsReader>,
        config: &PipelineConfig,
    ) -> Self {
        let shutdown = pipeline.shutdown_token().clone();
        Self {
            clicks: ClickService::new(sink, pipeline.queue().clone(), shutdown, config),
            stats,
            bucket: pipeline.bucket().clone(),
        }
    }
}
