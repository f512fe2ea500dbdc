use serde::{Deserialize, Serialize};

/// Kind of mutation that produced a [`ReviewEvent`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewEventKind {
    Created,
    Updated,
    Deleted,
}

/// Emitted once a review mutation has been committed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewEvent {
    /// Tour whose aggregate must be recomputed.
    pub tour_id: i32,
    /// Review that was mutated.
    pub review_id: i32,
    pub kind: ReviewEventKind,
}

impl ReviewEvent {
    pub fn created(tour_id: i32, review_id: i32) -> Self {
        Self {
            tour_id,
            review_id,
            kind: ReviewEventKind::Created,
        }
    }

    pub fn updated(tour_id: i32, review_id: i32) -> Self {
        Self {
            tour_id,
            review_id,
            kind: ReviewEventKind::Updated,
        }
    }

    pub fn deleted(tour_id: i32, review_id: i32) -> Self {
        Self {
            tour_id,
            review_id,
            kind: ReviewEventKind::Deleted,
        }
    }
}

/// Lifecycle of a single review mutation and the aggregate refresh it triggers.
///
/// ```text
/// Pending -> Committed -> AggregateScheduled -> AggregateApplied
///                |               |
///                +---------------+--> AggregateFailed
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStage {
    Pending,
    Committed,
    AggregateScheduled,
    AggregateApplied,
    AggregateFailed,
}

impl TriggerStage {
    /// Move to `next`, returning `None` when the transition is not allowed.
    pub fn advance(self, next: TriggerStage) -> Option<TriggerStage> {
        use TriggerStage::*;

        match (self, next) {
            (Pending, Committed)
            | (Committed, AggregateScheduled)
            | (Committed, AggregateFailed)
            | (AggregateScheduled, AggregateApplied)
            | (AggregateScheduled, AggregateFailed) => Some(next),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TriggerStage::AggregateApplied | TriggerStage::AggregateFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_follows_the_happy_path() {
        let stage = TriggerStage::Pending
            .advance(TriggerStage::Committed)
            .and_then(|stage| stage.advance(TriggerStage::AggregateScheduled))
            .and_then(|stage| stage.advance(TriggerStage::AggregateApplied));

        assert_eq!(stage, Some(TriggerStage::AggregateApplied));
        assert!(TriggerStage::AggregateApplied.is_terminal());
    }

    #[test]
    fn scheduling_failure_is_terminal() {
        let stage = TriggerStage::Committed.advance(TriggerStage::AggregateFailed);

        assert_eq!(stage, Some(TriggerStage::AggregateFailed));
        assert!(TriggerStage::AggregateFailed.is_terminal());
    }

    #[test]
    fn advance_rejects_skipping_the_commit() {
        assert_eq!(
            TriggerStage::Pending.advance(TriggerStage::AggregateScheduled),
            None
        );
        assert_eq!(
            TriggerStage::AggregateApplied.advance(TriggerStage::AggregateFailed),
            None
        );
        assert_eq!(
            TriggerStage::Pending.advance(TriggerStage::AggregateApplied),
            None
        );
    }

    #[test]
    fn event_serializes_with_snake_case_kind() {
        let event = ReviewEvent::deleted(4, 11);

        let value = serde_json::to_value(event).expect("serialization should succeed");

        assert_eq!(value["tour_id"], 4);
        assert_eq!(value["review_id"], 11);
        assert_eq!(value["kind"], "deleted");
    }
}
