//! Test fixtures for building candidate jobs.

use chrono::{DateTime, TimeZone, Utc};
use jobboard_core::domains::jobs::{FetchedBatch, Job, JobListing};
use jobboard_core::domains::source::SourceName;
use sqlx::PgPool;
use uuid::Uuid;

/// A company name no other test uses, so row counts stay per-test.
pub fn unique_company(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

/// A relevant posting as an ingestor would emit it.
pub fn go_job(
    source: SourceName,
    vendor_id: &str,
    title: &str,
    company: &str,
    posted_at: Option<DateTime<Utc>>,
) -> Job {
    let batch = FetchedBatch::new(source, Utc::now(), r#"{"stub": true}"#);
    batch.stamp(
        vendor_id,
        Job::builder()
            .title(title)
            .company(company)
            .location("Lagos, Nigeria")
            .country("Nigeria")
            .description("Build backend services in Go.")
            .url(format!("https://jobs.example/{}", vendor_id))
            .posted_at(posted_at)
            .build(),
    )
}

/// Stored rows for one company.
pub async fn listings_for(company: &str, pool: &PgPool) -> Vec<JobListing> {
    JobListing::find_all(pool)
        .await
        .unwrap()
        .into_iter()
        .filter(|l| l.company == company)
        .collect()
}
