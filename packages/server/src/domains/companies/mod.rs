//! Companies domain - cached branding details used to fill in missing logos.

pub mod activities;
pub mod enricher;
pub mod models;

pub use enricher::{build_enricher, BrandfetchEnricher, NoopEnricher};
pub use models::CompanyDetails;
