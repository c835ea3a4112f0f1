//! Server dependencies shared by the scheduler and the HTTP handlers.
//!
//! Everything external sits behind a trait so tests can swap in mocks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;

use crate::domains::jobs::activities::{sync_source, SyncOutcome};
use crate::domains::source::SourceName;
use crate::kernel::{BaseCompanyEnricher, BaseJobSource, BaseScheduleStore};

// =============================================================================
// ServerDeps
// =============================================================================

#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub sources: Arc<HashMap<SourceName, Arc<dyn BaseJobSource>>>,
    pub enricher: Arc<dyn BaseCompanyEnricher>,
    pub schedule_store: Arc<dyn BaseScheduleStore>,
    /// Budget for one fetch-and-save cycle.
    pub sync_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        sources: Vec<Arc<dyn BaseJobSource>>,
        enricher: Arc<dyn BaseCompanyEnricher>,
        schedule_store: Arc<dyn BaseScheduleStore>,
        sync_timeout: Duration,
    ) -> Self {
        let sources = sources.into_iter().map(|s| (s.name(), s)).collect();
        Self {
            db_pool,
            sources: Arc::new(sources),
            enricher,
            schedule_store,
            sync_timeout,
        }
    }

    pub fn source(&self, name: SourceName) -> Option<Arc<dyn BaseJobSource>> {
        self.sources.get(&name).cloned()
    }

    /// Run one cycle for `name` and record it in the run-state table.
    ///
    /// `next_run` is the next due time to store with the outcome; `None`
    /// keeps whatever is stored (manual runs do not move the schedule).
    /// Run-state write failures are logged, never returned.
    pub async fn run_source(
        &self,
        name: SourceName,
        next_run: Option<DateTime<Utc>>,
    ) -> Result<SyncOutcome> {
        let source = self
            .source(name)
            .with_context(|| format!("No ingestor configured for {}", name))?;

        if let Err(e) = self.schedule_store.mark_running(name, Utc::now()).await {
            warn!(source = %name, error = %e, "Failed to mark source as running");
        }

        let outcome = sync_source(
            source.as_ref(),
            &self.db_pool,
            self.enricher.as_ref(),
            self.sync_timeout,
        )
        .await;

        let record = outcome.clone().into_record(name, Utc::now(), next_run);
        if let Err(e) = self.schedule_store.record_run(&record).await {
            warn!(source = %name, error = %e, "Failed to record run outcome");
        }

        Ok(outcome)
    }
}
