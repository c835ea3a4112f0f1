//! Indeed ingestor, backed by the Apify `misceres~indeed-scraper` actor.

use apify_client::{
    decode_items, ApifyClient, ApifyError, IndeedJob, IndeedScraperInput, INDEED_SCRAPER,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::SourceHttp;
use crate::common::{mentions_remote, parse_vendor_timestamp};
use crate::domains::jobs::{FetchedBatch, Job};
use crate::domains::source::{SourceError, SourceName};
use crate::kernel::BaseJobSource;

const POSITION: &str = "golang";
const COUNTRY: &str = "NG";
const MAX_ITEMS: u32 = 20;

pub struct IndeedIngestor {
    http: SourceHttp,
    apify: ApifyClient,
}

impl IndeedIngestor {
    pub fn new(http: SourceHttp, apify: ApifyClient) -> Self {
        Self { http, apify }
    }
}

#[async_trait]
impl BaseJobSource for IndeedIngestor {
    fn name(&self) -> SourceName {
        SourceName::Indeed
    }

    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        info!(source = "indeed", position = POSITION, country = COUNTRY, "Running Indeed scraper");
        let input = IndeedScraperInput::new(POSITION, COUNTRY, MAX_ITEMS);
        let body = self
            .http
            .run_actor(SourceName::Indeed, &self.apify, INDEED_SCRAPER, &input)
            .await?;

        let jobs = parse_indeed_response(&body, Utc::now())?;
        info!(source = "indeed", count = jobs.len(), "Fetched jobs");
        Ok(jobs)
    }
}

/// Map an Indeed scraper dataset onto canonical jobs.
///
/// The scraper reports quota and input problems as an error dataset; those,
/// and an empty dataset, yield an empty batch rather than a failure.
pub fn parse_indeed_response(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<Job>, SourceError> {
    let vendor = SourceName::Indeed;
    let items: Vec<IndeedJob> = match decode_items(body) {
        Ok(items) => items,
        Err(ApifyError::Actor(message)) => {
            warn!(source = "indeed", error = %message, "Indeed scraper returned an error dataset");
            return Ok(Vec::new());
        }
        Err(e) => return Err(SourceError::parse(vendor, e)),
    };
    if items.is_empty() {
        info!(source = "indeed", "Indeed scraper returned no items");
        return Ok(Vec::new());
    }

    let batch = FetchedBatch::new(vendor, fetched_at, body);
    Ok(items
        .into_iter()
        .map(|item| {
            let posted_at = item
                .posting_date_parsed
                .as_deref()
                .and_then(parse_vendor_timestamp)
                .or_else(|| {
                    item.scraped_at
                        .as_deref()
                        .and_then(parse_vendor_timestamp)
                });
            let description = item.description.unwrap_or_default();
            let info = item.company_info.unwrap_or_default();
            let job_type = item.job_type.first().cloned().unwrap_or_default();

            let job = Job::builder()
                .title(item.position_name.unwrap_or_default())
                .company(item.company.unwrap_or_default())
                .company_url(info.url.unwrap_or_default())
                .company_logo(info.company_logo.unwrap_or_default())
                .location(item.location.unwrap_or_default())
                .is_remote(mentions_remote(&description))
                .description(description)
                .url(item.url.unwrap_or_default())
                .salary(item.salary.unwrap_or_default())
                .posted_at(posted_at)
                .employment_type(job_type.clone())
                .job_type(job_type)
                .build();
            batch.stamp(item.id.as_deref().unwrap_or_default(), job)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DATASET: &str = r#"[
        {
            "id": "5f1c0e2a9b",
            "positionName": "Golang Developer",
            "company": "Andela",
            "location": "Lagos",
            "salary": "₦600,000 - ₦900,000 a month",
            "jobType": ["Full-time", "Permanent"],
            "url": "https://ng.indeed.com/viewjob?jk=5f1c0e2a9b",
            "postingDateParsed": "2024-02-10T00:00:00.000Z",
            "scrapedAt": "2024-02-12T07:15:00.000Z",
            "description": "Hybrid role, remote two days a week.",
            "isExpired": null,
            "companyInfo": {
                "url": "https://andela.com",
                "companyLogo": "https://d2q79iu7y748jz.cloudfront.net/andela.png"
            }
        },
        {
            "positionName": "Go Engineer",
            "company": "Interswitch",
            "jobType": null,
            "scrapedAt": "2024-02-12T07:16:00.000Z"
        }
    ]"#;

    #[test]
    fn test_maps_dataset_items() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 2, 12, 8, 0, 0).unwrap();
        let jobs = parse_indeed_response(DATASET, fetched_at).unwrap();
        assert_eq!(jobs.len(), 2);

        let first = &jobs[0];
        assert_eq!(first.id, "indeed:5f1c0e2a9b");
        assert_eq!(first.source, "indeed");
        assert_eq!(first.job_type, "Full-time");
        assert_eq!(first.company_url, "https://andela.com");
        assert_eq!(first.company_logo, "https://d2q79iu7y748jz.cloudfront.net/andela.png");
        assert!(first.is_remote);
        assert_eq!(
            first.posted_at,
            Some(Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(first.exp_date, Utc.with_ymd_and_hms(2024, 3, 12, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_posted_at_falls_back_to_scrape_time() {
        let jobs = parse_indeed_response(DATASET, Utc::now()).unwrap();
        let second = &jobs[1];
        assert_eq!(
            second.posted_at,
            Some(Utc.with_ymd_and_hms(2024, 2, 12, 7, 16, 0).unwrap())
        );
        assert_eq!(second.job_type, "");
        assert!(!second.is_remote);
        assert_eq!(second.id, second.job_id);
    }

    #[test]
    fn test_error_and_empty_datasets_are_empty_batches() {
        let body = r#"[{"error": "Monthly usage hard limit exceeded"}]"#;
        let jobs = parse_indeed_response(body, Utc::now()).unwrap();
        assert!(jobs.is_empty());
        assert!(parse_indeed_response("[]", Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_non_array_body_is_parse_error() {
        let err = parse_indeed_response(r#"{"message": "oops"}"#, Utc::now()).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
