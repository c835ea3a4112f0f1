//! JSearch (RapidAPI) ingestor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::SourceHttp;
use crate::common::{
    first_non_empty, join_non_empty, lenient_bool, lenient_string, parse_vendor_timestamp,
};
use crate::domains::jobs::{FetchedBatch, Job};
use crate::domains::source::{SourceError, SourceName};
use crate::kernel::BaseJobSource;

const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
const QUERY: &str = "golang jobs in nigeria";

#[derive(Debug, Deserialize)]
struct JSearchResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    data: Option<Vec<JSearchJob>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JSearchJob {
    #[serde(deserialize_with = "lenient_string")]
    job_id: String,
    #[serde(deserialize_with = "lenient_string")]
    job_title: String,
    #[serde(deserialize_with = "lenient_string")]
    employer_name: String,
    #[serde(deserialize_with = "lenient_string")]
    employer_website: String,
    #[serde(deserialize_with = "lenient_string")]
    employer_logo: String,
    #[serde(deserialize_with = "lenient_string")]
    job_location: String,
    #[serde(deserialize_with = "lenient_string")]
    job_city: String,
    #[serde(deserialize_with = "lenient_string")]
    job_state: String,
    #[serde(deserialize_with = "lenient_string")]
    job_country: String,
    #[serde(deserialize_with = "lenient_string")]
    job_description: String,
    #[serde(deserialize_with = "lenient_string")]
    job_apply_link: String,
    #[serde(deserialize_with = "lenient_string")]
    job_salary: String,
    #[serde(deserialize_with = "lenient_string")]
    job_posted_at_datetime_utc: String,
    #[serde(deserialize_with = "lenient_string")]
    job_employment_type: String,
    #[serde(deserialize_with = "lenient_bool")]
    job_is_remote: bool,
}

pub struct JSearchIngestor {
    http: SourceHttp,
    base_url: String,
    api_key: String,
}

impl JSearchIngestor {
    pub fn new(http: SourceHttp, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl BaseJobSource for JSearchIngestor {
    fn name(&self) -> SourceName {
        SourceName::JSearch
    }

    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        let url = format!("{}/search", self.base_url);
        info!(source = "jsearch", query = QUERY, "Fetching jobs");

        let body = self
            .http
            .fetch_text(SourceName::JSearch, |client| {
                client
                    .get(&url)
                    .query(&[
                        ("query", QUERY),
                        ("page", "1"),
                        ("num_pages", "3"),
                        ("country", "ng"),
                    ])
                    .header("x-rapidapi-host", RAPIDAPI_HOST)
                    .header("x-rapidapi-key", &self.api_key)
            })
            .await?;

        let jobs = parse_jsearch_response(&body, Utc::now())?;
        info!(source = "jsearch", count = jobs.len(), "Fetched jobs");
        Ok(jobs)
    }
}

/// Map a JSearch `/search` body onto canonical jobs.
pub fn parse_jsearch_response(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<Job>, SourceError> {
    let vendor = SourceName::JSearch;
    let response: JSearchResponse =
        serde_json::from_str(body).map_err(|e| SourceError::parse(vendor, e))?;

    if response.status.as_deref() == Some("ERROR") || response.error.is_some() {
        let message = response
            .error
            .as_ref()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                other => other
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string()),
            })
            .unwrap_or_else(|| "status ERROR".to_string());
        return Err(SourceError::Vendor { vendor, message });
    }

    let batch = FetchedBatch::new(vendor, fetched_at, body);
    let jobs = response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            let city_state_country = join_non_empty(
                [
                    item.job_city.as_str(),
                    item.job_state.as_str(),
                    item.job_country.as_str(),
                ],
                ", ",
            );
            let location =
                first_non_empty([item.job_location.as_str(), city_state_country.as_str()]);
            let job = Job::builder()
                .title(item.job_title)
                .company(item.employer_name)
                .company_url(item.employer_website)
                .company_logo(item.employer_logo)
                .country(item.job_country)
                .state(item.job_state)
                .location(location)
                .description(item.job_description)
                .url(item.job_apply_link)
                .salary(item.job_salary)
                .posted_at(parse_vendor_timestamp(&item.job_posted_at_datetime_utc))
                .job_type(item.job_employment_type.clone())
                .employment_type(item.job_employment_type)
                .is_remote(item.job_is_remote)
                .build();
            batch.stamp(&item.job_id, job)
        })
        .collect();

    Ok(jobs)
}
