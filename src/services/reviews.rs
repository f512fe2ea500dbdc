use chrono::Utc;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use serde::Deserialize;

use crate::aggregation::ReviewEventSink;
use crate::domain::review::{Review, ReviewListQuery, ReviewWithTour};
use crate::domain::review_event::{ReviewEvent, TriggerStage};
use crate::forms::reviews::{AddReviewForm, EditReviewForm};
use crate::repository::{ReviewReader, ReviewWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted when listing reviews.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    /// Only list reviews of this tour.
    pub tour_id: Option<i32>,
    /// Page number requested by the UI (1-based).
    pub page: Option<usize>,
}

/// A committed review mutation and the state of the rating refresh it triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewMutation {
    /// The stored review, or the removed one for deletions.
    pub review: Review,
    pub event: ReviewEvent,
    /// `AggregateScheduled` when the refresh was queued, `AggregateFailed` otherwise.
    pub stage: TriggerStage,
}

impl ReviewMutation {
    fn committed(review: Review, event: ReviewEvent) -> Self {
        Self {
            review,
            event,
            stage: TriggerStage::Committed,
        }
    }

    /// Hand the event to `events`. A failure here never undoes the mutation.
    fn schedule<S>(mut self, events: &S) -> Self
    where
        S: ReviewEventSink + ?Sized,
    {
        let next = match events.publish(self.event) {
            Ok(()) => {
                log::debug!(
                    "rating refresh of tour {} scheduled after {:?} review {}",
                    self.event.tour_id,
                    self.event.kind,
                    self.event.review_id
                );
                TriggerStage::AggregateScheduled
            }
            Err(err) => {
                log::warn!(
                    "rating refresh of tour {} not scheduled after {:?} review {}: {err}",
                    self.event.tour_id,
                    self.event.kind,
                    self.event.review_id
                );
                TriggerStage::AggregateFailed
            }
        };

        self.stage = self.stage.advance(next).unwrap_or(TriggerStage::AggregateFailed);
        self
    }
}

/// Fetches a page of reviews, newest first, labelled with their tour names.
pub fn load_reviews<R>(repo: &R, query: ReviewQuery) -> ServiceResult<Paginated<ReviewWithTour>>
where
    R: ReviewReader + ?Sized,
{
    let ReviewQuery { tour_id, page } = query;
    let page = page.unwrap_or(1);

    let mut list_query = ReviewListQuery::new();

    if let Some(tour_id) = tour_id {
        list_query = list_query.tour(tour_id);
    }

    list_query = list_query.paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let (total, reviews) = repo.list_reviews(list_query).map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(Paginated::new(reviews, page, total_pages))
}

/// Stores a new review by `user_id` and schedules the tour's rating refresh.
pub fn create_review<R, S>(
    repo: &R,
    events: &S,
    user_id: i32,
    form: AddReviewForm,
) -> ServiceResult<ReviewMutation>
where
    R: ReviewWriter + ?Sized,
    S: ReviewEventSink + ?Sized,
{
    let new_review = form.into_new_review(user_id)?;

    let review = repo.create_review(&new_review).map_err(ServiceError::from)?;
    let event = ReviewEvent::created(review.tour_id, review.id);

    Ok(ReviewMutation::committed(review, event).schedule(events))
}

/// Changes the text and/or rating of a review and schedules the tour's rating refresh.
pub fn update_review<R, S>(
    repo: &R,
    events: &S,
    form: EditReviewForm,
) -> ServiceResult<ReviewMutation>
where
    R: ReviewWriter + ?Sized,
    S: ReviewEventSink + ?Sized,
{
    let review_id = form.review_id;
    let update = form.into_update_review(Utc::now().naive_utc())?;

    let review = repo
        .update_review(review_id, &update)
        .map_err(ServiceError::from)?;
    let event = ReviewEvent::updated(review.tour_id, review.id);

    Ok(ReviewMutation::committed(review, event).schedule(events))
}

/// Removes a review and schedules a refresh of the tour it belonged to.
pub fn delete_review<R, S>(repo: &R, events: &S, review_id: i32) -> ServiceResult<ReviewMutation>
where
    R: ReviewWriter + ?Sized,
    S: ReviewEventSink + ?Sized,
{
    // The tour reference comes from the deleted row itself.
    let review = repo.delete_review(review_id).map_err(ServiceError::from)?;
    let event = ReviewEvent::deleted(review.tour_id, review.id);

    Ok(ReviewMutation::committed(review, event).schedule(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use mockall::mock;
    use mockall::predicate::eq;

    use crate::aggregation::PublishError;
    use crate::domain::review_event::ReviewEventKind;
    use crate::repository::RepositoryError;
    use crate::repository::mock::{MockReviewReader, MockReviewWriter};

    mock! {
        pub EventSink {}

        impl ReviewEventSink for EventSink {
            fn publish(&self, event: ReviewEvent) -> Result<(), PublishError>;
        }
    }

    fn sample_review(id: i32, tour_id: i32, user_id: i32, rating: i32) -> Review {
        Review {
            id,
            tour_id,
            user_id,
            text: "Wonderful guide".to_string(),
            rating,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    fn add_form(tour_id: i32, rating: i32) -> AddReviewForm {
        AddReviewForm {
            tour_id,
            text: "Wonderful guide".to_string(),
            rating,
        }
    }

    #[test]
    fn create_review_publishes_created_event() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_create_review()
            .times(1)
            .withf(|new_review| {
                new_review.tour_id == 3 && new_review.user_id == 21 && new_review.rating == 5
            })
            .returning(|new_review| {
                Ok(sample_review(
                    11,
                    new_review.tour_id,
                    new_review.user_id,
                    new_review.rating,
                ))
            });
        events
            .expect_publish()
            .with(eq(ReviewEvent::created(3, 11)))
            .times(1)
            .returning(|_| Ok(()));

        let mutation =
            create_review(&repo, &events, 21, add_form(3, 5)).expect("expected success");

        assert_eq!(mutation.review.id, 11);
        assert_eq!(mutation.event.kind, ReviewEventKind::Created);
        assert_eq!(mutation.stage, TriggerStage::AggregateScheduled);
    }

    #[test]
    fn create_review_rejects_invalid_rating_before_storage() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_create_review().never();
        events.expect_publish().never();

        let result = create_review(&repo, &events, 1, add_form(3, 7));

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn duplicate_review_is_rejected_without_trigger() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_create_review()
            .times(1)
            .returning(|_| Err(RepositoryError::Duplicate("reviews.tour_id".to_string())));
        events.expect_publish().never();

        let result = create_review(&repo, &events, 1, add_form(3, 4));

        assert!(matches!(result, Err(ServiceError::Duplicate)));
    }

    #[test]
    fn scheduling_failure_does_not_fail_the_mutation() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_create_review()
            .returning(|new_review| Ok(sample_review(1, new_review.tour_id, 2, 4)));
        events
            .expect_publish()
            .times(1)
            .returning(|_| Err(PublishError::QueueFull));

        let mutation = create_review(&repo, &events, 2, add_form(8, 4))
            .expect("mutation should still succeed");

        assert_eq!(mutation.stage, TriggerStage::AggregateFailed);
        assert_eq!(mutation.review.tour_id, 8);
    }

    #[test]
    fn update_review_publishes_updated_event() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_update_review()
            .withf(|review_id, update| *review_id == 5 && update.rating == Some(1))
            .times(1)
            .returning(|review_id, _| Ok(sample_review(review_id, 9, 2, 1)));
        events
            .expect_publish()
            .with(eq(ReviewEvent::updated(9, 5)))
            .times(1)
            .returning(|_| Ok(()));

        let form = EditReviewForm {
            review_id: 5,
            text: None,
            rating: Some(1),
        };

        let mutation = update_review(&repo, &events, form).expect("expected success");

        assert_eq!(mutation.review.rating, 1);
        assert_eq!(mutation.stage, TriggerStage::AggregateScheduled);
    }

    #[test]
    fn update_of_missing_review_reports_not_found() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_update_review()
            .returning(|_, _| Err(RepositoryError::NotFound));
        events.expect_publish().never();

        let form = EditReviewForm {
            review_id: 404,
            text: Some("Updated words".to_string()),
            rating: None,
        };

        let result = update_review(&repo, &events, form);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn delete_review_uses_tour_of_deleted_row() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_delete_review()
            .with(eq(6))
            .times(1)
            .returning(|review_id| Ok(sample_review(review_id, 14, 3, 2)));
        events
            .expect_publish()
            .with(eq(ReviewEvent::deleted(14, 6)))
            .times(1)
            .returning(|_| Ok(()));

        let mutation = delete_review(&repo, &events, 6).expect("expected success");

        assert_eq!(mutation.event.tour_id, 14);
        assert_eq!(mutation.stage, TriggerStage::AggregateScheduled);
    }

    #[test]
    fn delete_of_missing_review_reports_not_found() {
        let mut repo = MockReviewWriter::new();
        let mut events = MockEventSink::new();

        repo.expect_delete_review()
            .returning(|_| Err(RepositoryError::NotFound));
        events.expect_publish().never();

        let result = delete_review(&repo, &events, 6);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn load_reviews_filters_by_tour_and_paginates() {
        let mut repo = MockReviewReader::new();

        repo.expect_list_reviews()
            .times(1)
            .withf(|query| {
                assert_eq!(query.tour_id, Some(4));
                assert_eq!(query.user_id, None);
                match &query.pagination {
                    Some(pagination) => {
                        assert_eq!(pagination.page, 2);
                        assert_eq!(pagination.per_page, DEFAULT_ITEMS_PER_PAGE);
                    }
                    None => panic!("expected pagination to be set"),
                }
                true
            })
            .returning(|_| {
                Ok((
                    1,
                    vec![ReviewWithTour {
                        review: sample_review(1, 4, 1, 5),
                        tour_name: Some("Forest Hiker".to_string()),
                    }],
                ))
            });

        let query = ReviewQuery {
            tour_id: Some(4),
            page: Some(2),
        };

        let page = load_reviews(&repo, query).expect("expected success");
        let serialized = serde_json::to_value(&page).expect("serialization should succeed");

        assert_eq!(serialized["page"], 2);
    }
}
