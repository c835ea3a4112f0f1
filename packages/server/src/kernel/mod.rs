//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod http;
pub mod response_cache;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use http::{build_http_client, with_retry, RetryPolicy};
pub use response_cache::ResponseCache;
pub use scheduled_tasks::{plan_first_run, IngestionScheduler};
pub use test_dependencies::{InMemoryScheduleStore, MockCompanyEnricher, MockJobSource};
pub use traits::*;
