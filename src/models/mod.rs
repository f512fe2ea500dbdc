pub mod review;
pub mod tour;
