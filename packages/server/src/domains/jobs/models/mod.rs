pub mod job;
pub mod listing;

pub use job::{FetchedBatch, Job};
pub use listing::JobListing;
