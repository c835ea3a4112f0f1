//! LinkedIn job search (RapidAPI) ingestor.
//!
//! This vendor's response contract is unstable: the same endpoint has been
//! seen returning a bare array, a `{"data": [...]}` envelope, and either of
//! those serialized inside a JSON string. Each shape has its own decoding
//! strategy, tried in order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::SourceHttp;
use crate::common::{
    first_non_empty, lenient_bool, lenient_string, lenient_string_list, parse_vendor_timestamp,
};
use crate::domains::jobs::{FetchedBatch, Job};
use crate::domains::source::{SourceError, SourceName};
use crate::kernel::BaseJobSource;

const RAPIDAPI_HOST: &str = "linkedin-job-search-api.p.rapidapi.com";

/// One posting as this vendor describes it. Every field is optional and
/// tolerant of type drift.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LinkedInPosting {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub organization: String,
    #[serde(deserialize_with = "lenient_string")]
    pub organization_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub organization_logo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin_org_description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date_posted: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub employment_type: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub locations_derived: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub countries_derived: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub regions_derived: Vec<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub remote_derived: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub salary_raw: String,
}

/// Which response shape a body decoded as.
#[derive(Debug, Clone)]
pub enum LinkedInPayload {
    /// A bare, non-empty JSON array of postings.
    LooseArray(Vec<LinkedInPosting>),
    /// `{"data": [...]}`.
    Envelope(Vec<LinkedInPosting>),
}

impl LinkedInPayload {
    pub fn into_postings(self) -> Vec<LinkedInPosting> {
        match self {
            LinkedInPayload::LooseArray(postings) | LinkedInPayload::Envelope(postings) => postings,
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            LinkedInPayload::LooseArray(_) => "array",
            LinkedInPayload::Envelope(_) => "envelope",
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Vec<LinkedInPosting>>,
}

/// Strategy 1: a bare array with at least one element.
pub fn decode_loose_array(body: &str) -> Result<LinkedInPayload, String> {
    let postings: Vec<LinkedInPosting> = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if postings.is_empty() {
        return Err("empty array".to_string());
    }
    Ok(LinkedInPayload::LooseArray(postings))
}

/// Strategy 2: the `{"data": [...]}` envelope.
pub fn decode_envelope(body: &str) -> Result<LinkedInPayload, String> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| e.to_string())?;
    Ok(LinkedInPayload::Envelope(envelope.data.unwrap_or_default()))
}

/// Strategy 3: either of the above, serialized inside a JSON string.
pub fn decode_string_wrapped(body: &str) -> Result<LinkedInPayload, String> {
    let inner = match serde_json::from_str::<Value>(body).map_err(|e| e.to_string())? {
        Value::String(inner) => inner,
        _ => return Err("not a JSON string".to_string()),
    };
    decode_loose_array(&inner).or_else(|_| decode_envelope(&inner))
}

/// Try every known shape in order and report the last failure if none match.
pub fn decode_linkedin_payload(body: &str) -> Result<LinkedInPayload, SourceError> {
    let strategies: [(&str, fn(&str) -> Result<LinkedInPayload, String>); 3] = [
        ("array", decode_loose_array),
        ("envelope", decode_envelope),
        ("string-wrapped", decode_string_wrapped),
    ];

    let mut last_error = String::new();
    for (name, strategy) in strategies {
        match strategy(body) {
            Ok(payload) => return Ok(payload),
            Err(e) => {
                debug!(strategy = name, error = %e, "LinkedIn decode strategy did not match");
                last_error = e;
            }
        }
    }
    Err(SourceError::parse(SourceName::LinkedIn, last_error))
}

/// Map a LinkedIn search body onto canonical jobs. An empty result is an error.
pub fn parse_linkedin_response(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<Job>, SourceError> {
    let vendor = SourceName::LinkedIn;
    let payload = decode_linkedin_payload(body)?;
    debug!(shape = payload.shape(), "Decoded LinkedIn payload");

    let postings = payload.into_postings();
    if postings.is_empty() {
        return Err(SourceError::NoData { vendor });
    }

    let batch = FetchedBatch::new(vendor, fetched_at, body);
    Ok(postings
        .into_iter()
        .map(|item| {
            let first = |values: &[String]| values.first().cloned().unwrap_or_default();
            let location = first_non_empty(
                item.locations_derived
                    .iter()
                    .chain(item.countries_derived.iter())
                    .map(String::as_str),
            );
            let employment = item.employment_type.join(", ");
            let job = Job::builder()
                .title(item.title)
                .company(item.organization)
                .company_url(item.organization_url)
                .company_logo(item.organization_logo)
                .country(first(&item.countries_derived))
                .state(first(&item.regions_derived))
                .location(location)
                .description(first_non_empty([
                    item.description.as_str(),
                    item.linkedin_org_description.as_str(),
                ]))
                .url(item.url)
                .salary(item.salary_raw)
                .posted_at(parse_vendor_timestamp(&item.date_posted))
                .job_type(employment.clone())
                .employment_type(employment)
                .is_remote(item.remote_derived)
                .build();
            batch.stamp(&item.id, job)
        })
        .collect())
}

pub struct LinkedInIngestor {
    http: SourceHttp,
    base_url: String,
    api_key: String,
}

impl LinkedInIngestor {
    pub fn new(http: SourceHttp, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl BaseJobSource for LinkedInIngestor {
    fn name(&self) -> SourceName {
        SourceName::LinkedIn
    }

    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        let url = format!("{}/active-jb-7d", self.base_url);
        info!(source = "linkedin", "Fetching jobs");

        let body = self
            .http
            .fetch_text(SourceName::LinkedIn, |client| {
                client
                    .get(&url)
                    .query(&[
                        ("limit", "20"),
                        ("offset", "0"),
                        ("title_filter", "golang"),
                        ("location_filter", "nigeria"),
                    ])
                    .header("x-rapidapi-host", RAPIDAPI_HOST)
                    .header("x-rapidapi-key", &self.api_key)
                    .header("Accept", "application/json")
            })
            .await?;

        let jobs = parse_linkedin_response(&body, Utc::now())?;
        info!(source = "linkedin", count = jobs.len(), "Fetched jobs");
        Ok(jobs)
    }
}
