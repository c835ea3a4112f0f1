//! Jobs domain - canonical postings, the policy filters, and persistence.

pub mod activities;
pub mod filters;
pub mod models;

pub use models::*;
