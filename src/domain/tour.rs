use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Domain representation of a bookable tour.
///
/// `ratings_quantity` and `ratings_average` are derived from the tour's
/// reviews and are only ever written by the rating aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tour {
    /// Unique identifier of the tour.
    pub id: i32,
    /// Human-readable name of the tour.
    pub name: String,
    /// Number of reviews currently attached to the tour.
    pub ratings_quantity: i32,
    /// Mean review rating, `0` while the tour has no reviews.
    pub ratings_average: f64,
    /// Timestamp for when the tour record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the tour record.
    pub updated_at: NaiveDateTime,
}

impl Tour {
    /// Current aggregate stored on the tour record.
    pub fn ratings(&self) -> RatingAggregate {
        RatingAggregate {
            quantity: self.ratings_quantity,
            average: self.ratings_average,
        }
    }
}

/// Payload required to insert a new tour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTour {
    /// Human-readable name of the tour.
    pub name: String,
}

impl NewTour {
    /// Construct a new tour payload with a trimmed name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        Self { name }
    }
}

/// Count and mean of the ratings of one tour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingAggregate {
    pub quantity: i32,
    pub average: f64,
}

impl RatingAggregate {
    /// Aggregate of a tour without reviews.
    pub const EMPTY: RatingAggregate = RatingAggregate {
        quantity: 0,
        average: 0.0,
    };
}
