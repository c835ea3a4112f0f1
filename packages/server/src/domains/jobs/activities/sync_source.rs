//! One fetch-and-save cycle for a single source.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::save_jobs::{save_jobs, SaveJobsError};
use crate::domains::schedules::{RunRecord, RunStatus};
use crate::domains::source::SourceName;
use crate::kernel::{BaseCompanyEnricher, BaseJobSource};

/// What a cycle did, in the shape the run-state table records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub status: RunStatus,
    pub count: usize,
    pub error: Option<String>,
}

impl SyncOutcome {
    fn failed(message: String) -> Self {
        Self {
            status: RunStatus::Failed,
            count: 0,
            error: Some(message),
        }
    }

    /// A save that upserted anything before failing is a partial success even
    /// though the rollback discarded it.
    pub fn from_save_error(err: &SaveJobsError) -> Self {
        let saved = err.saved();
        Self {
            status: if saved > 0 {
                RunStatus::PartialSuccess
            } else {
                RunStatus::Failed
            },
            count: saved,
            error: Some(match err {
                SaveJobsError::Database { error, .. } => format!("{}: {:#}", err, error),
                SaveJobsError::Cancelled { .. } => err.to_string(),
            }),
        }
    }

    pub fn into_record(
        self,
        source: SourceName,
        ran_at: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> RunRecord {
        RunRecord {
            source,
            status: self.status,
            ran_at,
            count: i32::try_from(self.count).unwrap_or(i32::MAX),
            error: self.error,
            next_run,
        }
    }
}

/// Fetch from `source` and persist the batch, all within `budget`.
///
/// Running out of budget while fetching abandons the vendor call; running out
/// while saving cancels the transaction at the next record boundary.
pub async fn sync_source(
    source: &dyn BaseJobSource,
    pool: &PgPool,
    enricher: &dyn BaseCompanyEnricher,
    budget: Duration,
) -> SyncOutcome {
    let name = source.name();
    let deadline = Instant::now() + budget;
    info!(source = %name, budget_secs = budget.as_secs(), "Starting sync");

    let fetched = tokio::select! {
        result = source.fetch_jobs() => result,
        _ = sleep_until(deadline) => {
            warn!(source = %name, "Fetch timed out");
            return SyncOutcome::failed(format!(
                "{}: fetch timed out after {}s",
                name,
                budget.as_secs()
            ));
        }
    };

    let jobs = match fetched {
        Ok(jobs) => jobs,
        Err(e) => {
            error!(source = %name, error = %e, "Fetch failed");
            return SyncOutcome::failed(e.to_string());
        }
    };

    let cancel = CancellationToken::new();
    let timer = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            cancel.cancel();
        })
    };
    let saved = save_jobs(jobs, pool, enricher, &cancel).await;
    timer.abort();

    match saved {
        Ok(summary) => {
            info!(source = %name, saved = summary.saved, "Sync finished");
            SyncOutcome {
                status: RunStatus::Success,
                count: summary.saved,
                error: None,
            }
        }
        Err(e) => {
            let outcome = SyncOutcome::from_save_error(&e);
            error!(
                source = %name,
                error = outcome.error.as_deref().unwrap_or_default(),
                "Save failed"
            );
            outcome
        }
    }
}
