//! LinkedIn ingestor, backed by the Apify `curious_coder~linkedin-jobs-scraper` actor.

use apify_client::{
    decode_items, ApifyClient, ApifyError, LinkedInJob, LinkedInScraperInput, LINKEDIN_JOBS_SCRAPER,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use super::SourceHttp;
use crate::common::{first_non_empty, mentions_remote, parse_vendor_timestamp};
use crate::domains::jobs::{FetchedBatch, Job};
use crate::domains::source::{SourceError, SourceName};
use crate::kernel::BaseJobSource;

/// Golang postings within 25 miles of Nigeria's LinkedIn geo id.
const SEARCH_URL: &str =
    "https://www.linkedin.com/jobs/search/?distance=25&geoId=105365761&keywords=golang";
const MAX_ITEMS: u32 = 20;

pub struct ApifyLinkedInIngestor {
    http: SourceHttp,
    apify: ApifyClient,
}

impl ApifyLinkedInIngestor {
    pub fn new(http: SourceHttp, apify: ApifyClient) -> Self {
        Self { http, apify }
    }
}

#[async_trait]
impl BaseJobSource for ApifyLinkedInIngestor {
    fn name(&self) -> SourceName {
        SourceName::ApifyLinkedIn
    }

    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        info!(source = "apify_linkedin", "Running LinkedIn jobs scraper");
        let input = LinkedInScraperInput::new(SEARCH_URL, MAX_ITEMS);
        let body = self
            .http
            .run_actor(
                SourceName::ApifyLinkedIn,
                &self.apify,
                LINKEDIN_JOBS_SCRAPER,
                &input,
            )
            .await?;

        let jobs = parse_apify_linkedin_response(&body, Utc::now())?;
        info!(source = "apify_linkedin", count = jobs.len(), "Fetched jobs");
        Ok(jobs)
    }
}

/// Map a LinkedIn scraper dataset onto canonical jobs. Error datasets and
/// empty datasets are failures for this source.
pub fn parse_apify_linkedin_response(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<Job>, SourceError> {
    let vendor = SourceName::ApifyLinkedIn;
    let items: Vec<LinkedInJob> = decode_items(body).map_err(|e| match e {
        ApifyError::Actor(message) => SourceError::Vendor { vendor, message },
        other => SourceError::parse(vendor, other),
    })?;
    if items.is_empty() {
        return Err(SourceError::NoData { vendor });
    }

    let batch = FetchedBatch::new(vendor, fetched_at, body);
    Ok(items
        .into_iter()
        .map(|item| {
            let location = item.location.unwrap_or_default();
            let description = item.description_text.unwrap_or_default();
            let address = item.company_address.unwrap_or_default();
            let employment = item.employment_type.unwrap_or_default();
            let is_remote = mentions_remote(&location) || mentions_remote(&description);

            let job = Job::builder()
                .title(item.title.unwrap_or_default())
                .company(item.company_name.unwrap_or_default())
                .company_url(first_non_empty([
                    item.company_website.as_deref().unwrap_or_default(),
                    item.company_linkedin_url.as_deref().unwrap_or_default(),
                ]))
                .company_logo(item.company_logo.unwrap_or_default())
                .state(address.address_region.unwrap_or_default())
                .country(address.address_country.unwrap_or_default())
                .location(location)
                .description(description)
                .url(item.link.unwrap_or_default())
                .salary(item.salary_info.first().cloned().unwrap_or_default())
                .posted_at(item.posted_at.as_deref().and_then(parse_vendor_timestamp))
                .job_type(employment.clone())
                .employment_type(employment)
                .is_remote(is_remote)
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
            "id": "3912345678",
            "link": "https://www.linkedin.com/jobs/view/3912345678",
            "title": "Software Engineer, Go",
            "companyName": "Moniepoint Inc.",
            "companyLinkedinUrl": "https://www.linkedin.com/company/moniepoint",
            "companyLogo": "https://media.licdn.com/moniepoint.png",
            "location": "Lagos, Lagos State, Nigeria",
            "salaryInfo": ["₦1,000,000/mo", "₦1,500,000/mo"],
            "postedAt": "2024-04-18",
            "descriptionText": "Own core banking services written in Go.",
            "employmentType": "Full-time",
            "companyAddress": {
                "addressLocality": "Lagos",
                "addressRegion": "Lagos State",
                "addressCountry": "NG"
            }
        },
        {
            "title": "Golang Engineer",
            "companyName": "Remote First Ltd",
            "companyWebsite": "https://remotefirst.io",
            "companyLinkedinUrl": "https://www.linkedin.com/company/remotefirst",
            "location": "Nigeria (Remote)",
            "salaryInfo": null
        }
    ]"#;

    #[test]
    fn test_maps_dataset_items() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 4, 20, 6, 0, 0).unwrap();
        let jobs = parse_apify_linkedin_response(DATASET, fetched_at).unwrap();
        assert_eq!(jobs.len(), 2);

        let first = &jobs[0];
        assert_eq!(first.id, "apify_linkedin:3912345678");
        assert_eq!(first.source, "apify_linkedin");
        assert_eq!(first.url, "https://www.linkedin.com/jobs/view/3912345678");
        assert_eq!(first.company_url, "https://www.linkedin.com/company/moniepoint");
        assert_eq!(first.state, "Lagos State");
        assert_eq!(first.country, "NG");
        assert_eq!(first.salary, "₦1,000,000/mo");
        assert_eq!(first.employment_type, "Full-time");
        assert!(!first.is_remote);
        assert_eq!(
            first.posted_at,
            Some(Utc.with_ymd_and_hms(2024, 4, 18, 0, 0, 0).unwrap())
        );
        assert_eq!(first.exp_date, Utc.with_ymd_and_hms(2024, 5, 20, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_website_preferred_and_remote_from_location() {
        let jobs = parse_apify_linkedin_response(DATASET, Utc::now()).unwrap();
        let second = &jobs[1];
        assert_eq!(second.company_url, "https://remotefirst.io");
        assert!(second.is_remote);
        assert_eq!(second.salary, "");
        assert!(second.posted_at.is_none());
        assert_eq!(second.id, second.job_id);
    }

    #[test]
    fn test_error_dataset_is_vendor_error() {
        let err = parse_apify_linkedin_response(r#"[{"error": "Actor run failed"}]"#, Utc::now())
            .unwrap_err();
        assert!(
            matches!(err, SourceError::Vendor { ref message, .. } if message == "Actor run failed")
        );
    }

    #[test]
    fn test_empty_dataset_is_no_data() {
        let err = parse_apify_linkedin_response("[]", Utc::now()).unwrap_err();
        assert!(matches!(err, SourceError::NoData { .. }));
    }
}
