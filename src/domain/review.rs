use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Domain representation of a single user's review of a tour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    /// Unique identifier of the review.
    pub id: i32,
    /// Tour the review belongs to. Fixed at creation.
    pub tour_id: i32,
    /// Author of the review. Fixed at creation.
    pub user_id: i32,
    /// Free-form review text.
    pub text: String,
    /// Star rating in the `1..=5` range.
    pub rating: i32,
    /// Timestamp for when the review was created.
    #[serde(skip_serializing, default)]
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the review.
    pub updated_at: NaiveDateTime,
}

/// A review as listed to readers, with the name of the reviewed tour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewWithTour {
    #[serde(flatten)]
    pub review: Review,
    /// `None` when the tour has been removed since the review was written.
    pub tour_name: Option<String>,
}

/// Payload required to insert a new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub tour_id: i32,
    pub user_id: i32,
    pub text: String,
    pub rating: i32,
}

impl NewReview {
    /// Construct a new review payload with trimmed text.
    pub fn new(tour_id: i32, user_id: i32, text: impl Into<String>, rating: i32) -> Self {
        let text = text.into().trim().to_string();
        Self {
            tour_id,
            user_id,
            text,
            rating,
        }
    }
}

/// Patch data applied when updating an existing review.
///
/// Only the text and the rating can change; the tour and the author of a
/// review are immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReview {
    /// Replacement text, left untouched when `None`.
    pub text: Option<String>,
    /// Replacement rating, left untouched when `None`.
    pub rating: Option<i32>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl UpdateReview {
    pub fn new(updated_at: NaiveDateTime) -> Self {
        Self {
            text: None,
            rating: None,
            updated_at,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into().trim().to_string());
        self
    }

    pub fn rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Whether the patch changes nothing besides the timestamp.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.rating.is_none()
    }
}

/// Query definition used to list reviews.
#[derive(Debug, Clone, Default)]
pub struct ReviewListQuery {
    /// Restrict the listing to a single tour.
    pub tour_id: Option<i32>,
    /// Restrict the listing to a single author.
    pub user_id: Option<i32>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl ReviewListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return reviews written for `tour_id`.
    pub fn tour(mut self, tour_id: i32) -> Self {
        self.tour_id = Some(tour_id);
        self
    }

    /// Only return reviews written by `user_id`.
    pub fn user(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
