use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use crate::domains::source::SourceName;

// =============================================================================
// Run status
// =============================================================================

/// Outcome of the most recent trigger for a source. Stored as its display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Scheduled,
    Running,
    Success,
    #[serde(rename = "Partial Success")]
    PartialSuccess,
    Failed,
}

#[derive(Debug, Error)]
#[error("unknown run status '{0}'")]
pub struct UnknownRunStatus(String);

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Scheduled => "Scheduled",
            RunStatus::Running => "Running",
            RunStatus::Success => "Success",
            RunStatus::PartialSuccess => "Partial Success",
            RunStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = UnknownRunStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            RunStatus::Scheduled,
            RunStatus::Running,
            RunStatus::Success,
            RunStatus::PartialSuccess,
            RunStatus::Failed,
        ]
        .into_iter()
        .find(|status| status.as_str() == s)
        .ok_or_else(|| UnknownRunStatus(s.to_string()))
    }
}

impl TryFrom<String> for RunStatus {
    type Error = UnknownRunStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// Run-state row
// =============================================================================

/// Persisted scheduler bookkeeping, one row per source.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct JobScheduleInfo {
    pub source_name: String,
    pub last_run_time: Option<DateTime<Utc>>,
    pub next_run_time: Option<DateTime<Utc>>,
    pub interval_hours: i32,
    #[sqlx(try_from = "String")]
    pub status: RunStatus,
    pub last_run_count: i32,
    pub last_error_msg: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// What a finished trigger writes back.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub source: SourceName,
    pub status: RunStatus,
    pub ran_at: DateTime<Utc>,
    pub count: i32,
    pub error: Option<String>,
    /// `None` keeps the stored next-due time (manual runs).
    pub next_run: Option<DateTime<Utc>>,
}

impl JobScheduleInfo {
    pub fn source(&self) -> Option<SourceName> {
        self.source_name.parse().ok()
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM job_schedule_info ORDER BY source_name")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_source(source: SourceName, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM job_schedule_info WHERE source_name = $1")
            .bind(source.as_str())
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Record the planned next trigger, creating a `Scheduled` row if the source has none.
    pub async fn ensure_scheduled(
        source: SourceName,
        next_run: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_schedule_info (source_name, next_run_time, interval_hours, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (source_name) DO UPDATE SET
                next_run_time = EXCLUDED.next_run_time,
                interval_hours = EXCLUDED.interval_hours,
                updated_at = NOW()
            "#,
        )
        .bind(source.as_str())
        .bind(next_run)
        .bind(source.interval_hours())
        .bind(RunStatus::Scheduled.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_running(source: SourceName, at: DateTime<Utc>, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_schedule_info (source_name, last_run_time, interval_hours, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (source_name) DO UPDATE SET
                last_run_time = EXCLUDED.last_run_time,
                status = EXCLUDED.status,
                updated_at = NOW()
            "#,
        )
        .bind(source.as_str())
        .bind(at)
        .bind(source.interval_hours())
        .bind(RunStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn record_run(record: &RunRecord, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_schedule_info (
                source_name, last_run_time, next_run_time, interval_hours,
                status, last_run_count, last_error_msg
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_name) DO UPDATE SET
                last_run_time = EXCLUDED.last_run_time,
                next_run_time = COALESCE(EXCLUDED.next_run_time, job_schedule_info.next_run_time),
                status = EXCLUDED.status,
                last_run_count = EXCLUDED.last_run_count,
                last_error_msg = EXCLUDED.last_error_msg,
                updated_at = NOW()
            "#,
        )
        .bind(record.source.as_str())
        .bind(record.ran_at)
        .bind(record.next_run)
        .bind(record.source.interval_hours())
        .bind(record.status.as_str())
        .bind(record.count)
        .bind(&record.error)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn update_next_run_time(
        source: SourceName,
        next_run: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_schedule_info
            SET next_run_time = $2, updated_at = NOW()
            WHERE source_name = $1
            "#,
        )
        .bind(source.as_str())
        .bind(next_run)
        .execute(pool)
        .await?;
        Ok(())
    }
}
