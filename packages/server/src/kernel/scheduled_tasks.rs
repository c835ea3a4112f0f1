//! Per-source ingestion scheduling using tokio-cron-scheduler.
//!
//! Every scheduled source always has exactly one pending one-shot trigger.
//! When it fires it first re-arms the next one-shot at `now + interval`, then
//! runs the fetch-and-save cycle, so a slow or failing run never delays its
//! own next trigger and never blocks other sources.
//!
//! ```text
//! start()
//!     ├─► load persisted run-state
//!     └─► for each source: plan_first_run() → ensure_scheduled() → arm()
//!
//! trigger fires
//!     ├─► arm(now + interval)
//!     └─► ServerDeps::run_source() → Running → Success | Partial Success | Failed
//!
//! shutdown()
//!     └─► persist next_tick_for_job() for every source
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domains::source::SourceName;
use crate::kernel::ServerDeps;

/// Delay before catching up on a run missed while the process was down.
pub const OVERDUE_GRACE: Duration = Duration::minutes(1);

/// Delay before the very first run of a source with no run-state.
pub const FIRST_RUN_DELAY: Duration = Duration::hours(1);

/// When a source should first fire after startup.
///
/// A persisted future due time is honoured. An overdue one runs shortly after
/// startup rather than immediately, so overdue sources don't all hit their
/// vendors at once. A source that has never been scheduled waits an hour.
pub fn plan_first_run(persisted: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match persisted.filter(|t| t.timestamp() > 0) {
        Some(next) if next > now => next,
        Some(_) => now + OVERDUE_GRACE,
        None => now + FIRST_RUN_DELAY,
    }
}

#[derive(Clone)]
pub struct IngestionScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    scheduler: JobScheduler,
    deps: ServerDeps,
    triggers: Mutex<HashMap<SourceName, Uuid>>,
}

impl IngestionScheduler {
    pub async fn new(deps: ServerDeps) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            inner: Arc::new(Inner {
                scheduler,
                deps,
                triggers: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Plan, persist and arm the first trigger of every source, then start ticking.
    pub async fn start(&self, sources: &[SourceName]) -> Result<()> {
        let now = Utc::now();
        let store = &self.inner.deps.schedule_store;

        let persisted: HashMap<SourceName, Option<DateTime<Utc>>> = match store.load_all().await {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|row| Some((row.source()?, row.next_run_time)))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load run-state, planning every source as new");
                HashMap::new()
            }
        };

        for &source in sources {
            if self.inner.deps.source(source).is_none() {
                warn!(source = %source, "No ingestor for scheduled source, skipping");
                continue;
            }

            let first_run = plan_first_run(persisted.get(&source).copied().flatten(), now);
            if let Err(e) = store.ensure_scheduled(source, first_run).await {
                warn!(source = %source, error = %e, "Failed to persist planned run");
            }
            self.arm(source, first_run).await?;
            info!(
                source = %source,
                next_run = %first_run,
                interval_hours = source.interval_hours(),
                "Scheduled source"
            );
        }

        self.inner.scheduler.start().await?;
        info!(sources = sources.len(), "Ingestion scheduler started");
        Ok(())
    }

    /// The pending trigger time of a source, as the scheduler sees it.
    pub async fn next_tick(&self, source: SourceName) -> Result<Option<DateTime<Utc>>> {
        let Some(id) = self.inner.triggers.lock().await.get(&source).copied() else {
            return Ok(None);
        };
        let mut scheduler = self.inner.scheduler.clone();
        Ok(scheduler.next_tick_for_job(id).await?)
    }

    /// Persist every source's pending trigger time, then stop the scheduler.
    pub async fn shutdown(&self) -> Result<()> {
        let triggers: Vec<(SourceName, Uuid)> = self
            .inner
            .triggers
            .lock()
            .await
            .iter()
            .map(|(s, id)| (*s, *id))
            .collect();

        let mut scheduler = self.inner.scheduler.clone();
        for (source, id) in triggers {
            match scheduler.next_tick_for_job(id).await {
                Ok(Some(next)) => {
                    if let Err(e) = self
                        .inner
                        .deps
                        .schedule_store
                        .set_next_run(source, next)
                        .await
                    {
                        warn!(
                            source = %source,
                            error = %e,
                            "Failed to persist next run on shutdown"
                        );
                    } else {
                        debug!(source = %source, next_run = %next, "Persisted next run");
                    }
                }
                Ok(None) => debug!(source = %source, "No pending trigger to persist"),
                Err(e) => warn!(source = %source, error = %e, "Failed to read next tick"),
            }
        }

        scheduler.shutdown().await?;
        info!("Ingestion scheduler stopped");
        Ok(())
    }

    async fn arm(&self, source: SourceName, at: DateTime<Utc>) -> Result<()> {
        let delay = (at - Utc::now()).to_std().unwrap_or_default();
        let this = self.clone();
        let job = Job::new_one_shot_async(delay, move |_uuid, _lock| this.clone().fire(source))?;
        let id = self.inner.scheduler.add(job).await?;
        self.inner.triggers.lock().await.insert(source, id);
        Ok(())
    }

    fn fire(self, source: SourceName) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let next = Utc::now() + source.interval();
            if let Err(e) = self.arm(source, next).await {
                error!(source = %source, error = %e, "Failed to re-arm trigger");
            }

            match self.inner.deps.run_source(source, Some(next)).await {
                Ok(outcome) => info!(
                    source = %source,
                    status = %outcome.status,
                    count = outcome.count,
                    next_run = %next,
                    "Scheduled run finished"
                ),
                Err(e) => error!(source = %source, error = %e, "Scheduled run could not start"),
            }
        })
    }
}
