pub mod annotated;
pub mod observation;
pub mod season;
pub mod stats;
pub mod verdict;
