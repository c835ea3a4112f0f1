//! Canonical job posting shared by every source.

use anyhow::Result;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::domains::source::SourceName;

// ============================================================================
// Job Model
// ============================================================================

/// A normalized job posting as produced by a source ingestor.
///
/// Text attributes use the empty string for "vendor did not say"; they are
/// stored as NULL so the read side can tell them apart from real values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
pub struct Job {
    // Identity
    pub id: String,
    pub job_id: String,

    // Descriptive
    pub title: String,
    pub company: String,
    pub company_url: String,
    pub company_logo: String,
    pub country: String,
    pub state: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub salary: String,
    pub job_type: String,
    pub employment_type: String,
    pub is_remote: bool,

    // Provenance
    pub source: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub date_gotten: DateTime<Utc>,
    pub exp_date: DateTime<Utc>,
    pub raw_data: String,
}

/// Per-fetch provenance shared by every record of one vendor response.
#[derive(Debug, Clone, Copy)]
pub struct FetchedBatch<'a> {
    pub source: SourceName,
    pub fetched_at: DateTime<Utc>,
    pub raw: &'a str,
}

impl<'a> FetchedBatch<'a> {
    pub fn new(source: SourceName, fetched_at: DateTime<Utc>, raw: &'a str) -> Self {
        Self {
            source,
            fetched_at,
            raw,
        }
    }

    /// Postings are advertised for one calendar month after they were fetched.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.fetched_at
            .checked_add_months(Months::new(1))
            .unwrap_or(self.fetched_at)
    }

    /// Primary key and vendor id for a record.
    ///
    /// A vendor id gives a stable `<source>:<vendor id>` key so refetches update
    /// in place; without one the record gets a fresh random key.
    pub fn identity(&self, vendor_id: &str) -> (String, String) {
        let vendor_id = vendor_id.trim();
        if vendor_id.is_empty() {
            let generated = Uuid::new_v4().to_string();
            (generated.clone(), generated)
        } else {
            (
                format!("{}:{}", self.source.as_str(), vendor_id),
                vendor_id.to_string(),
            )
        }
    }

    /// Fill in identity and provenance on a record built from vendor fields.
    pub fn stamp(&self, vendor_id: &str, job: Job) -> Job {
        let (id, job_id) = self.identity(vendor_id);
        Job {
            id,
            job_id,
            source: self.source.as_str().to_string(),
            date_gotten: self.fetched_at,
            exp_date: self.expires_at(),
            raw_data: self.raw.to_string(),
            ..job
        }
    }
}

impl Job {
    /// Insert or update on `id`. Every mutable column is overwritten and
    /// `updated_at` is bumped; `created_at` keeps its first value.
    pub async fn upsert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, job_id, title, company, company_url, company_logo, country, state,
                location, description, url, salary, job_type, employment_type, is_remote,
                source, posted_at, date_gotten, exp_date, raw_data, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, NULLIF($5, ''), NULLIF($6, ''), NULLIF($7, ''), NULLIF($8, ''),
                NULLIF($9, ''), NULLIF($10, ''), NULLIF($11, ''), NULLIF($12, ''), NULLIF($13, ''),
                NULLIF($14, ''), $15, $16, $17, $18, $19, NULLIF($20, ''), NOW(), NOW()
            )
            ON CONFLICT (id) DO UPDATE SET
                job_id = EXCLUDED.job_id,
                title = EXCLUDED.title,
                company = EXCLUDED.company,
                company_url = EXCLUDED.company_url,
                company_logo = EXCLUDED.company_logo,
                country = EXCLUDED.country,
                state = EXCLUDED.state,
                location = EXCLUDED.location,
                description = EXCLUDED.description,
                url = EXCLUDED.url,
                salary = EXCLUDED.salary,
                job_type = EXCLUDED.job_type,
                employment_type = EXCLUDED.employment_type,
                is_remote = EXCLUDED.is_remote,
                source = EXCLUDED.source,
                posted_at = EXCLUDED.posted_at,
                date_gotten = EXCLUDED.date_gotten,
                exp_date = EXCLUDED.exp_date,
                raw_data = EXCLUDED.raw_data,
                updated_at = NOW()
            "#,
        )
        .bind(&self.id)
        .bind(&self.job_id)
        .bind(&self.title)
        .bind(&self.company)
        .bind(&self.company_url)
        .bind(&self.company_logo)
        .bind(&self.country)
        .bind(&self.state)
        .bind(&self.location)
        .bind(&self.description)
        .bind(&self.url)
        .bind(&self.salary)
        .bind(&self.job_type)
        .bind(&self.employment_type)
        .bind(self.is_remote)
        .bind(&self.source)
        .bind(self.posted_at)
        .bind(self.date_gotten)
        .bind(self.exp_date)
        .bind(&self.raw_data)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Whether another stored row already carries this posting's natural key
    /// (case-insensitive title and company, same UTC calendar month of posting).
    ///
    /// Rows with the same `id` do not count: those are updates, not duplicates.
    pub async fn has_stored_duplicate(&self, pool: &PgPool) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM jobs
                WHERE LOWER(title) = LOWER($1)
                  AND LOWER(company) = LOWER($2)
                  AND date_trunc('month', posted_at AT TIME ZONE 'UTC')
                      IS NOT DISTINCT FROM date_trunc('month', $3::timestamptz AT TIME ZONE 'UTC')
                  AND id <> $4
            )
            "#,
        )
        .bind(&self.title)
        .bind(&self.company)
        .bind(self.posted_at)
        .bind(&self.id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}
