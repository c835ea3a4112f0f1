// Go Jobs Nigeria - ingestion core
//
// Pulls Go job postings for Nigeria from four vendors, filters and enriches
// them, stores them in Postgres, and serves them over a small signed API.
// Each source runs on its own schedule with run-state persisted per source.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
