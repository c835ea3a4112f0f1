//! Source domain - the job-board vendors postings are ingested from.

pub mod error;
pub mod ingestors;
pub mod models;

pub use error::SourceError;
pub use models::{SourceName, UnknownSource};
