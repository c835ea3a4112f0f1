//! Postgres-backed run-state store used by the scheduler.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{JobScheduleInfo, RunRecord};
use crate::domains::source::SourceName;
use crate::kernel::BaseScheduleStore;

pub struct PgScheduleStore {
    pool: PgPool,
}

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseScheduleStore for PgScheduleStore {
    async fn load_all(&self) -> Result<Vec<JobScheduleInfo>> {
        JobScheduleInfo::find_all(&self.pool).await
    }

    async fn ensure_scheduled(&self, source: SourceName, next_run: DateTime<Utc>) -> Result<()> {
        JobScheduleInfo::ensure_scheduled(source, next_run, &self.pool).await
    }

    async fn mark_running(&self, source: SourceName, at: DateTime<Utc>) -> Result<()> {
        JobScheduleInfo::mark_running(source, at, &self.pool).await
    }

    async fn record_run(&self, record: &RunRecord) -> Result<()> {
        JobScheduleInfo::record_run(record, &self.pool).await
    }

    async fn set_next_run(&self, source: SourceName, next_run: DateTime<Utc>) -> Result<()> {
        JobScheduleInfo::update_next_run_time(source, next_run, &self.pool).await
    }
}
