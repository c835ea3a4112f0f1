//! Scheduler run-state: when each source last ran, how it went, and when it is next due.

pub mod models;
pub mod store;

pub use models::*;
pub use store::PgScheduleStore;
