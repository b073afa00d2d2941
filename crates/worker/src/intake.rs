//! Bounded intake queue between click producers and the aggregator.

use clicker_core::{ClickEvent, Error, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Create an intake queue holding at most `capacity` events.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn intake_queue(capacity: usize) -> (IntakeQueue, IntakeReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (IntakeQueue { tx }, IntakeReceiver { rx })
}

/// Producer side of the intake queue.
#[derive(Debug, Clone)]
pub struct IntakeQueue {
    tx: mpsc::Sender<ClickEvent>,
}

impl IntakeQueue {
    /// Hand an event to the aggregator, waiting while the queue is full.
    ///
    /// Fails with [`Error::IngestionCancelled`] if `cancel` fires before a
    /// slot frees up, or if the aggregator has already closed the queue. A
    /// failed call leaves the queue untouched.
    pub async fn enqueue(&self, event: ClickEvent, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            // A free slot wins over a cancellation that fired at the same time.
            biased;
            permit = self.tx.reserve() => match permit {
                Ok(permit) => {
                    permit.send(event);
                    Ok(())
                }
                Err(_) => Err(Error::IngestionCancelled),
            },
            _ = cancel.cancelled() => Err(Error::IngestionCancelled),
        }
    }

    /// Events currently waiting for the aggregator.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// True once the aggregator stopped accepting events.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the intake queue, owned by the aggregator.
#[derive(Debug)]
pub struct IntakeReceiver {
    rx: mpsc::Receiver<ClickEvent>,
}

impl IntakeReceiver {
    /// Next event; `None` once the queue is closed and empty.
    pub async fn recv(&mut self) -> Option<ClickEvent> {
        self.rx.recv().await
    }

    /// Refuse new events and return everything already accepted.
    pub async fn close_and_drain(&mut self) -> Vec<ClickEvent> {
        self.rx.close();

        let mut drained = Vec::with_capacity(self.rx.len());
        while let Some(event) = self.rx.recv().await {
            drained.push(event);
        }
        drained
    }
}
