pub mod batch;
pub mod contours;
pub mod rate;
