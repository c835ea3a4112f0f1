pub mod save_jobs;
pub mod sync_source;

pub use save_jobs::{save_jobs, SaveJobsError, SaveSummary};
pub use sync_source::{sync_source, SyncOutcome};
