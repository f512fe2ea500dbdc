use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::tour::{NewTour as DomainNewTour, RatingAggregate, Tour as DomainTour};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tours)]
pub struct Tour {
    pub id: i32,
    pub name: String,
    pub ratings_quantity: i32,
    pub ratings_average: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tours)]
pub struct NewTour<'a> {
    pub name: &'a str,
}

/// Changeset touching only the derived rating columns.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::tours)]
pub struct TourRatings {
    pub ratings_quantity: i32,
    pub ratings_average: f64,
}

impl From<Tour> for DomainTour {
    fn from(value: Tour) -> Self {
        Self {
            id: value.id,
            name: value.name,
            ratings_quantity: value.ratings_quantity,
            ratings_average: value.ratings_average,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewTour> for NewTour<'a> {
    fn from(value: &'a DomainNewTour) -> Self {
        Self {
            name: value.name.as_str(),
        }
    }
}

impl From<&RatingAggregate> for TourRatings {
    fn from(value: &RatingAggregate) -> Self {
        Self {
            ratings_quantity: value.quantity,
            ratings_average: value.average,
        }
    }
}
