use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::review::{NewReview, UpdateReview};

/// Minimum number of characters in a review once trimmed.
pub const TEXT_MIN_LEN: usize = 5;
/// Maximum number of characters in a review once trimmed.
pub const TEXT_MAX_LEN: usize = 255;

/// Result type returned by the review form helpers.
pub type ReviewFormResult<T> = Result<T, ReviewFormError>;

/// Errors that can occur while processing review forms.
#[derive(Debug, Error)]
pub enum ReviewFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The text falls outside the allowed length after trimming.
    #[error(
        "review text must be between {min} and {max} characters, got {0}",
        min = TEXT_MIN_LEN,
        max = TEXT_MAX_LEN
    )]
    TextLength(usize),
    /// An edit that changes neither the text nor the rating.
    #[error("nothing to update")]
    EmptyUpdate,
}

/// Payload submitted when a user reviews a tour.
#[derive(Debug, Deserialize, Validate)]
pub struct AddReviewForm {
    /// Tour being reviewed.
    #[validate(range(min = 1))]
    pub tour_id: i32,
    /// Review text entered by the user. Its length is checked once trimmed.
    pub text: String,
    /// Star rating.
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

impl AddReviewForm {
    /// Validates and trims the payload into a domain `NewReview` authored by `user_id`.
    pub fn into_new_review(self, user_id: i32) -> ReviewFormResult<NewReview> {
        self.validate()?;

        let text = trimmed_text(&self.text)?;

        Ok(NewReview::new(self.tour_id, user_id, text, self.rating))
    }
}

/// Payload submitted when a user edits their review.
#[derive(Debug, Deserialize, Validate)]
pub struct EditReviewForm {
    /// Identifier of the review to update.
    #[validate(range(min = 1))]
    pub review_id: i32,
    /// Replacement text, if any. Its length is checked once trimmed.
    pub text: Option<String>,
    /// Replacement rating, if any.
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
}

impl EditReviewForm {
    /// Validates and trims the payload into a domain `UpdateReview`.
    pub fn into_update_review(self, updated_at: NaiveDateTime) -> ReviewFormResult<UpdateReview> {
        self.validate()?;

        let mut update = UpdateReview::new(updated_at);

        if let Some(text) = self.text.as_deref() {
            update = update.text(trimmed_text(text)?);
        }
        if let Some(rating) = self.rating {
            update = update.rating(rating);
        }

        if update.is_empty() {
            return Err(ReviewFormError::EmptyUpdate);
        }

        Ok(update)
    }
}

fn trimmed_text(input: &str) -> ReviewFormResult<&str> {
    let trimmed = input.trim();
    let len = trimmed.chars().count();

    if !(TEXT_MIN_LEN..=TEXT_MAX_LEN).contains(&len) {
        return Err(ReviewFormError::TextLength(len));
    }

    Ok(trimmed)
}
