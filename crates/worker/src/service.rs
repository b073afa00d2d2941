//! Click registration: validate the banner, then hand the click to the queue.

use clicker_core::{BannerId, ClickEvent, Error, Result, StorageSink};
use moka::future::Cache;
use std::sync::Arc;
use telemetry::metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::intake::IntakeQueue;

/// Maximum cached banner lookups.
const BANNER_CACHE_MAX_CAPACITY: u64 = 100_000;

/// Entry point for recording clicks.
///
/// Only banners confirmed to exist are cached. An unknown banner is looked up
/// again on every click so it starts counting as soon as it is created.
#[derive(Clone)]
pub struct ClickService {
    sink: Arc<dyn StorageSink>,
    queue: IntakeQueue,
    shutdown: CancellationToken,
    known_banners: Cache<BannerId, ()>,
}

impl ClickService {
    pub fn new(
        sink: Arc<dyn StorageSink>,
        queue: IntakeQueue,
        shutdown: CancellationToken,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            sink,
            queue,
            shutdown,
            known_banners: Cache::builder()
                .max_capacity(BANNER_CACHE_MAX_CAPACITY)
                .time_to_live(config.banner_cache_ttl())
                .build(),
        }
    }

    /// Record one click on `banner_id`.
    ///
    /// Fails with [`Error::BannerNotFound`] for an unknown banner, leaving the
    /// aggregation untouched. If the queue is full this waits until there is
    /// room, `cancel` fires, or the pipeline shuts down.
    pub async fn register_click(&self, banner_id: BannerId, cancel: &CancellationToken) -> Result<()> {
        metrics().clicks_received.inc();

        self.ensure_banner_exists(banner_id).await?;

        let result = tokio::select! {
            biased;
            result = self.queue.enqueue(ClickEvent::new(banner_id), &self.shutdown) => result,
            _ = cancel.cancelled() => Err(Error::IngestionCancelled),
        };

        match &result {
            Ok(()) => metrics().clicks_enqueued.inc(),
            Err(e) => {
                metrics().clicks_cancelled.inc();
                debug!(banner_id = %banner_id, error = %e, "Click not enqueued");
            }
        }
        result
    }

    async fn ensure_banner_exists(&self, banner_id: BannerId) -> Result<()> {
        if self.known_banners.get(&banner_id).await.is_some() {
            metrics().banner_cache_hits.inc();
            return Ok(());
        }

        let exists = self.sink.banner_exists(banner_id).await.map_err(|e| {
            metrics().banner_lookup_errors.inc();
            warn!(banner_id = %banner_id, error = %e, "Banner lookup failed");
            e
        })?;

        if !exists {
            metrics().clicks_rejected.inc();
            debug!(banner_id = %banner_id, "Click for unknown banner");
            return Err(Error::BannerNotFound(banner_id));
        }

        self.known_banners.insert(banner_id, ()).await;
        Ok(())
    }

    /// Forget a cached lookup.
    pub async fn invalidate(&self, banner_id: BannerId) {
        self.known_banners.invalidate(&banner_id).await;
    }

    pub fn queue(&self) -> &IntakeQueue {
        &self.queue
    }
}
