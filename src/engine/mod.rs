pub mod scoring;
pub mod streak;
