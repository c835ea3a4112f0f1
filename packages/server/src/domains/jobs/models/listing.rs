use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// A stored job as served by the read API. Empty columns are omitted from JSON.
#[derive(FromRow, Debug, Clone, Serialize)]
pub struct JobListing {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    pub is_remote: bool,
    pub source: String,
    pub date_gotten: DateTime<Utc>,
    pub exp_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const LISTING_COLUMNS: &str = "id, job_id, title, company, company_url, company_logo, country, \
     state, location, description, url, salary, posted_at, job_type, employment_type, \
     is_remote, source, date_gotten, exp_date, updated_at";

impl JobListing {
    /// All stored jobs, newest posting first; undated postings last.
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let query = format!(
            "SELECT {} FROM jobs ORDER BY posted_at DESC NULLS LAST, date_gotten DESC",
            LISTING_COLUMNS
        );
        sqlx::query_as::<_, Self>(&query)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_id(id: &str, pool: &PgPool) -> Result<Option<Self>> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", LISTING_COLUMNS);
        sqlx::query_as::<_, Self>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_source(source: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE source = $1 ORDER BY posted_at DESC NULLS LAST",
            LISTING_COLUMNS
        );
        sqlx::query_as::<_, Self>(&query)
            .bind(source)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }
}
