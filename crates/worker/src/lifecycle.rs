//! Pipeline lifecycle: start the aggregator, stop it with a final flush.

use clicker_core::{Error, Result, StorageSink};
use std::sync::Arc;
use telemetry::health;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use validator::Validate;

use crate::aggregation::AggregationBucket;
use crate::aggregator::{AggregatorReport, AggregatorState, ClickAggregator};
use crate::config::PipelineConfig;
use crate::flush::{FlushCoordinator, FlushPolicy};
use crate::intake::{intake_queue, IntakeQueue};

enum PipelineTask {
    Running(JoinHandle<AggregatorReport>),
    Stopped(AggregatorReport),
}

/// A running intake queue plus the aggregator task that drains it.
pub struct ClickPipeline {
    queue: IntakeQueue,
    bucket: Arc<AggregationBucket>,
    shutdown: CancellationToken,
    state: watch::Receiver<AggregatorState>,
    task: Mutex<PipelineTask>,
}

impl ClickPipeline {
    /// Build the queue and bucket and spawn the aggregator.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &PipelineConfig, sink: Arc<dyn StorageSink>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("invalid pipeline config: {}", e)))?;

        let (queue, receiver) = intake_queue(config.queue_capacity);
        let bucket = Arc::new(AggregationBucket::new());
        let flusher = FlushCoordinator::new(sink, bucket.clone(), FlushPolicy::from(config));
        let aggregator = ClickAggregator::new(receiver, flusher, config.flush_interval());
        let state = aggregator.subscribe();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(aggregator.run(shutdown.clone()));
        health().aggregator.set_healthy();

        info!(
            queue_capacity = config.queue_capacity,
            flush_interval_ms = config.flush_interval_ms,
            "Click pipeline started"
        );

        Ok(Self {
            queue,
            bucket,
            shutdown,
            state,
            task: Mutex::new(PipelineTask::Running(handle)),
        })
    }

    /// Producer handle for the intake queue.
    pub fn queue(&self) -> &IntakeQueue {
        &self.queue
    }

    pub fn bucket(&self) -> &Arc<AggregationBucket> {
        &self.bucket
    }

    /// Token cancelled when the pipeline stops.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn state(&self) -> AggregatorState {
        *self.state.borrow()
    }

    /// Cancel the aggregator and wait for its final flush.
    ///
    /// Calling this again returns the same report without doing anything.
    pub async fn stop(&self) -> Result<AggregatorReport> {
        let mut task = self.task.lock().await;

        let handle = match &mut *task {
            PipelineTask::Stopped(report) => return Ok(report.clone()),
            PipelineTask::Running(handle) => handle,
        };

        info!("Stopping click pipeline");
        self.shutdown.cancel();

        let report = match handle.await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Click aggregator task failed");
                health().aggregator.set_unhealthy("aggregator task failed");
                *task = PipelineTask::Stopped(AggregatorReport::default());
                return Err(Error::internal(format!("aggregator task failed: {}", e)));
            }
        };

        health().aggregator.set_unhealthy("stopped");
        *task = PipelineTask::Stopped(report.clone());

        Ok(report)
    }
}
