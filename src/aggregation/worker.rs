//! Background consumer of review events.
//!
//! Mutations publish into a bounded queue without waiting. A single task
//! drains the queue, drops repeated tour ids within a batch and recomputes
//! each remaining tour on the blocking pool, one at a time. Running one
//! recomputation at a time means write-backs for a tour never interleave.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::aggregation::{PublishError, ReviewEventSink, recompute};
use crate::domain::review_event::{ReviewEvent, TriggerStage};
use crate::repository::{ReviewReader, TourRatingsWriter};

enum Command {
    Recompute(ReviewEvent),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

#[derive(Debug, Default)]
struct AggregatorStats {
    received: AtomicU64,
    coalesced: AtomicU64,
    rejected: AtomicU64,
    applied: AtomicU64,
    failed: AtomicU64,
}

impl AggregatorStats {
    fn snapshot(&self) -> AggregatorStatsSnapshot {
        AggregatorStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters of a [`RatingAggregator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregatorStatsSnapshot {
    /// Events taken off the queue.
    pub received: u64,
    /// Events folded into a recomputation already pending in the same batch.
    pub coalesced: u64,
    /// Events refused because the queue was full.
    pub rejected: u64,
    /// Recomputations written back to their tour.
    pub applied: u64,
    /// Recomputations that ended in an error.
    pub failed: u64,
}

/// Handle to the task that refreshes tour ratings after review mutations.
pub struct RatingAggregator {
    sender: mpsc::Sender<Command>,
    worker: JoinHandle<()>,
    stats: Arc<AggregatorStats>,
}

impl RatingAggregator {
    /// Start the worker on the current tokio runtime.
    ///
    /// `capacity` bounds the number of queued events; zero is treated as one.
    pub fn spawn<R>(repo: R, capacity: usize) -> Self
    where
        R: ReviewReader + TourRatingsWriter + Clone + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let stats = Arc::new(AggregatorStats::default());
        let worker = tokio::spawn(run(repo, receiver, Arc::clone(&stats)));

        log::info!("rating aggregator started with queue capacity {}", capacity.max(1));

        Self {
            sender,
            worker,
            stats,
        }
    }

    /// A cloneable [`ReviewEventSink`] feeding this aggregator.
    pub fn publisher(&self) -> ReviewEventPublisher {
        ReviewEventPublisher {
            sender: self.sender.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Wait until every event queued before this call has been processed.
    pub async fn flush(&self) -> Result<(), PublishError> {
        let (done, wait) = oneshot::channel();
        self.sender
            .send(Command::Flush(done))
            .await
            .map_err(|_| PublishError::Closed)?;
        wait.await.map_err(|_| PublishError::Closed)
    }

    pub fn stats(&self) -> AggregatorStatsSnapshot {
        self.stats.snapshot()
    }

    /// Process what is already queued, then stop the worker.
    ///
    /// Publishers created from this aggregator get [`PublishError::Closed`]
    /// afterwards.
    pub async fn shutdown(self) {
        let RatingAggregator { sender, worker, .. } = self;

        if sender.send(Command::Shutdown).await.is_err() {
            log::warn!("rating aggregator already stopped");
        }
        drop(sender);

        if let Err(err) = worker.await {
            log::error!("rating aggregator terminated abnormally: {err}");
        }
    }
}

/// Non-blocking entry point into a [`RatingAggregator`].
#[derive(Clone)]
pub struct ReviewEventPublisher {
    sender: mpsc::Sender<Command>,
    stats: Arc<AggregatorStats>,
}

impl ReviewEventSink for ReviewEventPublisher {
    fn publish(&self, event: ReviewEvent) -> Result<(), PublishError> {
        match self.sender.try_send(Command::Recompute(event)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                Err(PublishError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(PublishError::Closed),
        }
    }
}

#[derive(Default)]
struct Batch {
    tours: Vec<i32>,
    waiters: Vec<oneshot::Sender<()>>,
    stop: bool,
}

impl Batch {
    fn push(&mut self, command: Command, stats: &AggregatorStats) {
        match command {
            Command::Recompute(event) => {
                stats.received.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "review {} {:?} on tour {} picked up",
                    event.review_id,
                    event.kind,
                    event.tour_id
                );
                if self.tours.contains(&event.tour_id) {
                    stats.coalesced.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.tours.push(event.tour_id);
                }
            }
            Command::Flush(done) => self.waiters.push(done),
            Command::Shutdown => self.stop = true,
        }
    }
}

async fn run<R>(repo: R, mut receiver: mpsc::Receiver<Command>, stats: Arc<AggregatorStats>)
where
    R: ReviewReader + TourRatingsWriter + Clone + Send + 'static,
{
    while let Some(first) = receiver.recv().await {
        let mut batch = Batch::default();
        batch.push(first, &stats);
        while let Ok(command) = receiver.try_recv() {
            batch.push(command, &stats);
        }

        for tour_id in batch.tours {
            let stage = apply(repo.clone(), tour_id).await;
            let counter = match stage {
                TriggerStage::AggregateApplied => &stats.applied,
                _ => &stats.failed,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }

        for done in batch.waiters {
            // The flushing side may have given up waiting.
            let _ = done.send(());
        }

        if batch.stop {
            break;
        }
    }

    log::info!("rating aggregator stopped");
}

async fn apply<R>(repo: R, tour_id: i32) -> TriggerStage
where
    R: ReviewReader + TourRatingsWriter + Send + 'static,
{
    match tokio::task::spawn_blocking(move || recompute(&repo, tour_id)).await {
        Ok(Ok(aggregate)) => {
            log::debug!(
                "tour {tour_id} ratings set to {} averaging {}",
                aggregate.quantity,
                aggregate.average
            );
            TriggerStage::AggregateApplied
        }
        Ok(Err(err)) => {
            log::warn!("rating aggregate not applied: {err}");
            TriggerStage::AggregateFailed
        }
        Err(err) => {
            log::error!("rating recomputation for tour {tour_id} panicked: {err}");
            TriggerStage::AggregateFailed
        }
    }
}
