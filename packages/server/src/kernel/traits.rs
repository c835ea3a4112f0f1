// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (filtering, saving, scheduling) lives in domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseJobSource, BaseScheduleStore)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domains::jobs::Job;
use crate::domains::schedules::{JobScheduleInfo, RunRecord};
use crate::domains::source::{SourceError, SourceName};

// =============================================================================
// Job Source Trait (one implementation per vendor feed)
// =============================================================================

#[async_trait]
pub trait BaseJobSource: Send + Sync {
    fn name(&self) -> SourceName;

    /// Fetch one batch of canonical jobs, in vendor order.
    ///
    /// A vendor that legitimately has nothing this cycle may return an empty
    /// batch; anything malformed is an error, never a partial batch.
    async fn fetch_jobs(&self) -> std::result::Result<Vec<Job>, SourceError>;
}

// =============================================================================
// Company Enrichment Trait
// =============================================================================

#[async_trait]
pub trait BaseCompanyEnricher: Send + Sync {
    /// Find a logo for a company. `Ok(None)` means enrichment is off or found nothing.
    async fn find_logo(&self, company: &str, company_url: &str) -> Result<Option<String>>;
}

// =============================================================================
// Schedule Store Trait (scheduler run-state)
// =============================================================================

#[async_trait]
pub trait BaseScheduleStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<JobScheduleInfo>>;

    /// Persist the planned next trigger, creating a `Scheduled` row when missing.
    async fn ensure_scheduled(&self, source: SourceName, next_run: DateTime<Utc>) -> Result<()>;

    async fn mark_running(&self, source: SourceName, at: DateTime<Utc>) -> Result<()>;

    async fn record_run(&self, record: &RunRecord) -> Result<()>;

    async fn set_next_run(&self, source: SourceName, next_run: DateTime<Utc>) -> Result<()>;
}
