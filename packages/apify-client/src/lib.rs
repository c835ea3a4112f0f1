//! Pure Apify REST API client.
//!
//! A minimal client for running Apify actors synchronously and reading their
//! dataset. Callers get the raw dataset body so they can inspect error
//! datasets or cache responses before decoding the items.
//!
//! # Example
//!
//! ```rust,ignore
//! use apify_client::{ApifyClient, IndeedScraperInput, INDEED_SCRAPER};
//!
//! let client = ApifyClient::new("your-api-token".into());
//!
//! let body = client
//!     .run_sync_dataset(INDEED_SCRAPER, &IndeedScraperInput::new("golang", "NG", 20))
//!     .await?;
//! let jobs = apify_client::decode_items::<apify_client::IndeedJob>(&body)?;
//! ```

pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    dataset_error, CompanyAddress, IndeedCompanyInfo, IndeedJob, IndeedScraperInput, LinkedInJob,
    LinkedInScraperInput,
};

use serde::{de::DeserializeOwned, Serialize};

pub const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for misceres/indeed-scraper.
pub const INDEED_SCRAPER: &str = "misceres~indeed-scraper";

/// Actor ID for curious_coder/linkedin-jobs-scraper.
pub const LINKEDIN_JOBS_SCRAPER: &str = "curious_coder~linkedin-jobs-scraper";

#[derive(Clone)]
pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self::with_client(reqwest::Client::new(), token, BASE_URL.to_string())
    }

    /// Use a preconfigured HTTP client (timeouts) and an alternate API root,
    /// e.g. a local stub.
    pub fn with_client(client: reqwest::Client, token: String, base_url: String) -> Self {
        Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run an actor and wait for it to finish, returning the default dataset as raw JSON text.
    pub async fn run_sync_dataset<I: Serialize + ?Sized>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> Result<String> {
        let url = format!(
            "{}/acts/{}/run-sync-get-dataset-items",
            self.base_url, actor_id
        );
        tracing::debug!(actor_id, "Running Apify actor synchronously");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        tracing::debug!(actor_id, bytes = body.len(), "Apify dataset received");
        Ok(body)
    }
}

/// Decode a dataset body into typed items, surfacing actor error datasets as
/// [`ApifyError::Actor`].
pub fn decode_items<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    // Item types are lenient, so an error dataset would otherwise decode as one empty item.
    if let Some(message) = dataset_error(body) {
        return Err(ApifyError::Actor(message));
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_items_reports_actor_error() {
        let result = decode_items::<IndeedJob>(r#"[{"error": "Invalid input"}]"#);
        assert!(matches!(result, Err(ApifyError::Actor(m)) if m == "Invalid input"));
    }

    #[test]
    fn test_decode_items_reads_dataset() {
        let items = decode_items::<IndeedJob>(
            r#"[{"id": "a1", "positionName": "Golang Developer", "jobType": ["Full-time"]}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].position_name.as_deref(), Some("Golang Developer"));
        assert_eq!(items[0].job_type, vec!["Full-time".to_string()]);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApifyClient::with_client(
            reqwest::Client::new(),
            "token".into(),
            "http://localhost:8081/apify/v2/".into(),
        );
        assert_eq!(client.base_url(), "http://localhost:8081/apify/v2");
    }
}
