use pushkind_common::db::{DbConnection, DbPool};

use crate::domain::review::{NewReview, Review, ReviewListQuery, ReviewWithTour, UpdateReview};
use crate::domain::tour::{NewTour, RatingAggregate, Tour};

pub mod errors;
pub mod review;
pub mod tour;

#[cfg(test)]
pub mod mock;

pub use errors::{RepositoryError, RepositoryResult};

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over review records.
pub trait ReviewReader {
    fn get_review_by_id(&self, id: i32) -> RepositoryResult<Option<Review>>;
    /// Every review attached to `tour_id`, in no particular order.
    fn list_reviews_by_tour(&self, tour_id: i32) -> RepositoryResult<Vec<Review>>;
    /// Reviews matching `query`, newest first, each with the name of its tour.
    fn list_reviews(
        &self,
        query: ReviewListQuery,
    ) -> RepositoryResult<(usize, Vec<ReviewWithTour>)>;
}

/// Write operations over review records.
pub trait ReviewWriter {
    /// Fails with [`RepositoryError::Duplicate`] when the user already reviewed the tour.
    fn create_review(&self, new_review: &NewReview) -> RepositoryResult<Review>;
    fn update_review(&self, review_id: i32, updates: &UpdateReview) -> RepositoryResult<Review>;
    /// Removes the review and hands back the deleted row.
    fn delete_review(&self, review_id: i32) -> RepositoryResult<Review>;
}

/// Read-only operations over tour records.
pub trait TourReader {
    fn get_tour_by_id(&self, id: i32) -> RepositoryResult<Option<Tour>>;
    fn list_tour_ids(&self) -> RepositoryResult<Vec<i32>>;
}

/// Write operations over tour records. Rating columns are out of reach here.
pub trait TourWriter {
    fn create_tour(&self, new_tour: &NewTour) -> RepositoryResult<Tour>;
    fn delete_tour(&self, tour_id: i32) -> RepositoryResult<()>;
}

/// Sole writer of the derived rating columns of a tour.
pub trait TourRatingsWriter {
    fn set_tour_ratings(&self, tour_id: i32, ratings: &RatingAggregate) -> RepositoryResult<()>;
}
