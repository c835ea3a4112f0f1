//! Persistence gateway for one fetched batch.
//!
//! The whole batch is written in a single transaction. Each candidate is
//! classified (blocklist, relevance, duplicate), optionally enriched with a
//! company logo, and upserted on `id`. Any database error or cancellation
//! rolls the batch back; partial batches are never committed.

use std::collections::HashSet;

use sqlx::PgPool;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domains::jobs::filters::{classify, NaturalKey, Verdict};
use crate::domains::jobs::models::Job;
use crate::kernel::BaseCompanyEnricher;

// ============================================================================
// Types
// ============================================================================

/// Per-batch filtering and persistence counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub blocked: usize,
    pub not_relevant: usize,
    pub duplicates: usize,
}

/// Why a batch was not committed. `saved` is the number of upserts executed
/// before the abort; none of them survive the rollback.
#[derive(Debug, Error)]
pub enum SaveJobsError {
    #[error("save cancelled after {saved} records")]
    Cancelled { saved: usize },

    #[error("database error after {saved} records")]
    Database {
        saved: usize,
        #[source]
        error: anyhow::Error,
    },
}

impl SaveJobsError {
    pub fn saved(&self) -> usize {
        match self {
            SaveJobsError::Cancelled { saved } | SaveJobsError::Database { saved, .. } => *saved,
        }
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Filter, enrich and upsert a batch in vendor order.
pub async fn save_jobs(
    jobs: Vec<Job>,
    pool: &PgPool,
    enricher: &dyn BaseCompanyEnricher,
    cancel: &CancellationToken,
) -> Result<SaveSummary, SaveJobsError> {
    let source = jobs.first().map(|j| j.source.clone()).unwrap_or_default();
    let total = jobs.len();
    let mut summary = SaveSummary::default();
    let mut seen: HashSet<NaturalKey> = HashSet::new();

    let mut tx = pool.begin().await.map_err(|e| SaveJobsError::Database {
        saved: 0,
        error: e.into(),
    })?;

    for mut job in jobs {
        if cancel.is_cancelled() {
            warn!(source = %source, saved = summary.saved, "Save cancelled, rolling back batch");
            return Err(SaveJobsError::Cancelled {
                saved: summary.saved,
            });
        }

        match classify(&job) {
            Verdict::Blocked => {
                debug!(company = %job.company, title = %job.title, "Skipping blocked company");
                summary.blocked += 1;
                continue;
            }
            Verdict::NotRelevant => {
                debug!(title = %job.title, "Skipping irrelevant posting");
                summary.not_relevant += 1;
                continue;
            }
            Verdict::Accept => {}
        }

        if !seen.insert(NaturalKey::of(&job)) {
            debug!(title = %job.title, company = %job.company, "Skipping duplicate within batch");
            summary.duplicates += 1;
            continue;
        }

        match job.has_stored_duplicate(pool).await {
            Ok(true) => {
                debug!(title = %job.title, company = %job.company, "Skipping stored duplicate");
                summary.duplicates += 1;
                continue;
            }
            Ok(false) => {}
            // A transient lookup failure must not drop a new posting.
            Err(e) => {
                warn!(error = %e, job_id = %job.id, "Duplicate check failed, treating as new")
            }
        }

        if job.company_logo.is_empty() && !job.company.trim().is_empty() {
            match enricher.find_logo(&job.company, &job.company_url).await {
                Ok(Some(logo)) => job.company_logo = logo,
                Ok(None) => {}
                Err(e) => warn!(error = %e, company = %job.company, "Company enrichment failed"),
            }
        }

        if let Err(error) = job.upsert(&mut *tx).await {
            warn!(
                error = %error,
                job_id = %job.id,
                saved = summary.saved,
                "Upsert failed, rolling back batch"
            );
            return Err(SaveJobsError::Database {
                saved: summary.saved,
                error,
            });
        }
        summary.saved += 1;
    }

    tx.commit().await.map_err(|e| SaveJobsError::Database {
        saved: summary.saved,
        error: e.into(),
    })?;

    info!(
        source = %source,
        total,
        saved = summary.saved,
        blocked = summary.blocked,
        not_relevant = summary.not_relevant,
        duplicates = summary.duplicates,
        "Saved job batch"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reports_accumulated_count() {
        assert_eq!(SaveJobsError::Cancelled { saved: 3 }.saved(), 3);
        let err = SaveJobsError::Database {
            saved: 2,
            error: anyhow::anyhow!("connection reset"),
        };
        assert_eq!(err.saved(), 2);
        assert_eq!(err.to_string(), "database error after 2 records");
        let cause = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("connection reset"));
    }
}
