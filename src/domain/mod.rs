pub mod review;
pub mod review_event;
pub mod tour;
