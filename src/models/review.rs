use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::review::{
    NewReview as DomainNewReview, Review as DomainReview, UpdateReview as DomainUpdateReview,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::reviews)]
pub struct Review {
    pub id: i32,
    pub tour_id: i32,
    pub user_id: i32,
    pub text: String,
    pub rating: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::reviews)]
pub struct NewReview<'a> {
    pub tour_id: i32,
    pub user_id: i32,
    pub text: &'a str,
    pub rating: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::reviews)]
pub struct UpdateReview<'a> {
    pub text: Option<&'a str>,
    pub rating: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl From<Review> for DomainReview {
    fn from(value: Review) -> Self {
        Self {
            id: value.id,
            tour_id: value.tour_id,
            user_id: value.user_id,
            text: value.text,
            rating: value.rating,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewReview> for NewReview<'a> {
    fn from(value: &'a DomainNewReview) -> Self {
        Self {
            tour_id: value.tour_id,
            user_id: value.user_id,
            text: value.text.as_str(),
            rating: value.rating,
        }
    }
}

impl<'a> From<&'a DomainUpdateReview> for UpdateReview<'a> {
    fn from(value: &'a DomainUpdateReview) -> Self {
        Self {
            text: value.text.as_deref(),
            rating: value.rating,
            updated_at: value.updated_at,
        }
    }
}
