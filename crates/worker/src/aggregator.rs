//! Click aggregator: the single worker that owns the aggregation bucket.
//!
//! The loop waits for whichever comes first:
//! - cancellation: close the intake queue, drain it, flush once, stop
//! - an event: count it
//! - a timer tick: flush, while still counting events that keep arriving

use clicker_core::ClickEvent;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::flush::{FlushCoordinator, FlushOutcome};
use crate::intake::IntakeReceiver;

/// Where the aggregator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Accumulating,
    Flushing,
    Stopped,
}

/// Totals over the aggregator's lifetime, returned when it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatorReport {
    pub clicks_received: u64,
    /// Flushes that reached storage (empty flushes are not counted)
    pub flushes: u64,
    pub failed_flushes: u64,
    pub clicks_flushed: u64,
    pub clicks_dropped: u64,
    pub clicks_requeued: u64,
}

impl AggregatorReport {
    fn observe(&mut self, outcome: &FlushOutcome) {
        match outcome {
            FlushOutcome::Skipped => {}
            FlushOutcome::Saved { clicks, .. } => {
                self.flushes += 1;
                self.clicks_flushed += clicks;
            }
            FlushOutcome::Failed {
                clicks, requeued, ..
            } => {
                self.flushes += 1;
                self.failed_flushes += 1;
                if *requeued {
                    self.clicks_requeued += clicks;
                } else {
                    self.clicks_dropped += clicks;
                }
            }
        }
    }
}

/// Background worker merging intake events and flushing them on a timer.
pub struct ClickAggregator {
    receiver: IntakeReceiver,
    flusher: FlushCoordinator,
    interval: Duration,
    state: watch::Sender<AggregatorState>,
    report: AggregatorReport,
}

impl ClickAggregator {
    pub fn new(receiver: IntakeReceiver, flusher: FlushCoordinator, interval: Duration) -> Self {
        let (state, _) = watch::channel(AggregatorState::Accumulating);
        Self {
            receiver,
            flusher,
            interval,
            state,
            report: AggregatorReport::default(),
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<AggregatorState> {
        self.state.subscribe()
    }

    /// Run until `cancel` fires or every producer is gone.
    ///
    /// Always ends with exactly one forced flush of whatever is pending.
    pub async fn run(mut self, cancel: CancellationToken) -> AggregatorReport {
        info!(
            flush_interval_ms = %self.interval.as_millis(),
            "Click aggregator starting"
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Click aggregator received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    self.flush_while_accumulating().await;
                }
                event = self.receiver.recv() => match event {
                    Some(event) => record(&self.flusher, &mut self.report, event),
                    None => {
                        info!("Intake queue closed by producers");
                        break;
                    }
                },
            }
        }

        self.shutdown().await
    }

    /// Timer flush. Events keep landing in the fresh bucket while storage
    /// works on the snapshot.
    async fn flush_while_accumulating(&mut self) {
        self.state.send_replace(AggregatorState::Flushing);

        let flush = self.flusher.flush();
        tokio::pin!(flush);

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut flush => break outcome,
                Some(event) = self.receiver.recv() => {
                    record(&self.flusher, &mut self.report, event);
                }
            }
        };

        self.report.observe(&outcome);
        self.state.send_replace(AggregatorState::Accumulating);
    }

    async fn shutdown(mut self) -> AggregatorReport {
        self.state.send_replace(AggregatorState::Flushing);

        let drained = self.receiver.close_and_drain().await;
        if !drained.is_empty() {
            debug!(count = drained.len(), "Drained intake queue");
        }
        for event in drained {
            record(&self.flusher, &mut self.report, event);
        }

        let outcome = self.flusher.flush_final().await;
        self.report.observe(&outcome);

        self.state.send_replace(AggregatorState::Stopped);

        info!(
            received = self.report.clicks_received,
            flushed = self.report.clicks_flushed,
            dropped = self.report.clicks_dropped,
            flushes = self.report.flushes,
            failed_flushes = self.report.failed_flushes,
            "Click aggregator stopped"
        );

        self.report
    }
}

fn record(flusher: &FlushCoordinator, report: &mut AggregatorReport, event: ClickEvent) {
    flusher.bucket().record(event.banner_id);
    report.clicks_received += 1;
}
