//! Keeps the derived rating columns of every tour in line with its reviews.
//!
//! Aggregates are always rebuilt from the full set of reviews of a tour,
//! never patched incrementally. A lost or repeated trigger is therefore
//! corrected by the next recomputation of the same tour.

use serde::Serialize;
use thiserror::Error;

use crate::domain::review::Review;
use crate::domain::review_event::ReviewEvent;
use crate::domain::tour::RatingAggregate;
use crate::repository::{
    RepositoryError, RepositoryResult, ReviewReader, TourRatingsWriter, TourReader,
};

pub mod worker;

pub use worker::{AggregatorStatsSnapshot, RatingAggregator, ReviewEventPublisher};

/// Number of decimal places kept in a persisted rating average.
pub const AVERAGE_DECIMALS: i32 = 1;

/// Failure while refreshing the aggregate of a single tour.
///
/// These never reach the caller of a review mutation; the worker logs them.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The tour was removed after its review was written.
    #[error("tour {0} no longer exists")]
    TourMissing(i32),
    #[error("failed to read reviews of tour {tour_id}: {source}")]
    Read {
        tour_id: i32,
        #[source]
        source: RepositoryError,
    },
    #[error("failed to store ratings of tour {tour_id}: {source}")]
    WriteBack {
        tour_id: i32,
        #[source]
        source: RepositoryError,
    },
}

/// Failure to hand a [`ReviewEvent`] over to the aggregation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("rating aggregation queue is full")]
    QueueFull,
    #[error("rating aggregation has stopped")]
    Closed,
}

/// Consumer of committed review mutations.
pub trait ReviewEventSink {
    /// Queue `event` without waiting for the aggregate to be refreshed.
    fn publish(&self, event: ReviewEvent) -> Result<(), PublishError>;
}

/// Outcome of [`reconcile_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub recomputed: usize,
    pub failed: usize,
}

/// Count and mean rating of `reviews`. No reviews yield `(0, 0)`.
pub fn compute_aggregate(reviews: &[Review]) -> RatingAggregate {
    if reviews.is_empty() {
        return RatingAggregate::EMPTY;
    }

    let sum: i64 = reviews.iter().map(|review| i64::from(review.rating)).sum();
    let mean = sum as f64 / reviews.len() as f64;

    RatingAggregate {
        quantity: i32::try_from(reviews.len()).unwrap_or(i32::MAX),
        average: round_average(mean),
    }
}

/// Round half away from zero to [`AVERAGE_DECIMALS`] places.
pub fn round_average(value: f64) -> f64 {
    let factor = 10f64.powi(AVERAGE_DECIMALS);
    (value * factor).round() / factor
}

/// Rebuild the aggregate of `tour_id` from its reviews and store it on the tour.
pub fn recompute<R>(repo: &R, tour_id: i32) -> Result<RatingAggregate, AggregationError>
where
    R: ReviewReader + TourRatingsWriter + ?Sized,
{
    let reviews = repo
        .list_reviews_by_tour(tour_id)
        .map_err(|source| AggregationError::Read { tour_id, source })?;

    let aggregate = compute_aggregate(&reviews);

    match repo.set_tour_ratings(tour_id, &aggregate) {
        Ok(()) => Ok(aggregate),
        Err(RepositoryError::NotFound) => Err(AggregationError::TourMissing(tour_id)),
        Err(source) => Err(AggregationError::WriteBack { tour_id, source }),
    }
}

/// Recompute every tour. Failures are logged and counted, never fatal.
pub fn reconcile_all<R>(repo: &R) -> RepositoryResult<ReconcileReport>
where
    R: ReviewReader + TourReader + TourRatingsWriter + ?Sized,
{
    let mut report = ReconcileReport::default();

    for tour_id in repo.list_tour_ids()? {
        match recompute(repo, tour_id) {
            Ok(aggregate) => {
                log::debug!(
                    "tour {tour_id} reconciled to {} ratings averaging {}",
                    aggregate.quantity,
                    aggregate.average
                );
                report.recomputed += 1;
            }
            Err(err) => {
                log::warn!("failed to reconcile ratings: {err}");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
