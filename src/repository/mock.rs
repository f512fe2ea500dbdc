use mockall::mock;

use super::{RepositoryResult, ReviewReader, ReviewWriter, TourRatingsWriter, TourReader};
use crate::domain::{
    review::{NewReview, Review, ReviewListQuery, ReviewWithTour, UpdateReview},
    tour::{RatingAggregate, Tour},
};

mock! {
    pub ReviewReader {}

    impl ReviewReader for ReviewReader {
        fn get_review_by_id(&self, id: i32) -> RepositoryResult<Option<Review>>;
        fn list_reviews_by_tour(&self, tour_id: i32) -> RepositoryResult<Vec<Review>>;
        fn list_reviews(&self, query: ReviewListQuery) -> RepositoryResult<(usize, Vec<ReviewWithTour>)>;
    }
}

mock! {
    pub ReviewWriter {}

    impl ReviewWriter for ReviewWriter {
        fn create_review(&self, new_review: &NewReview) -> RepositoryResult<Review>;
        fn update_review(&self, review_id: i32, updates: &UpdateReview) -> RepositoryResult<Review>;
        fn delete_review(&self, review_id: i32) -> RepositoryResult<Review>;
    }
}

// Combined mock for the aggregation, which reads reviews and tours and
// writes rating columns through a single handle.
mock! {
    pub RatingsRepo {}

    impl ReviewReader for RatingsRepo {
        fn get_review_by_id(&self, id: i32) -> RepositoryResult<Option<Review>>;
        fn list_reviews_by_tour(&self, tour_id: i32) -> RepositoryResult<Vec<Review>>;
        fn list_reviews(&self, query: ReviewListQuery) -> RepositoryResult<(usize, Vec<ReviewWithTour>)>;
    }

    impl TourReader for RatingsRepo {
        fn get_tour_by_id(&self, id: i32) -> RepositoryResult<Option<Tour>>;
        fn list_tour_ids(&self) -> RepositoryResult<Vec<i32>>;
    }

    impl TourRatingsWriter for RatingsRepo {
        fn set_tour_ratings(&self, tour_id: i32, ratings: &RatingAggregate) -> RepositoryResult<()>;
    }
}
