//! Vendor ingestors implementing the kernel's BaseJobSource trait.
//!
//! Each ingestor performs one vendor request (with bounded retries for
//! transient failures), keeps the raw body, and maps the vendor shape onto
//! canonical [`Job`](crate::domains::jobs::Job) records. Parsing is split into
//! pure `parse_*` functions so every accepted shape is unit tested.

mod apify_linkedin;
mod indeed;
mod jsearch;
mod linkedin;

pub use apify_linkedin::{parse_apify_linkedin_response, ApifyLinkedInIngestor};
pub use indeed::{parse_indeed_response, IndeedIngestor};
pub use jsearch::{parse_jsearch_response, JSearchIngestor};
pub use linkedin::{parse_linkedin_response, LinkedInIngestor, LinkedInPayload};

use std::sync::Arc;

use apify_client::{ApifyClient, ApifyError};
use serde::Serialize;

use super::{SourceError, SourceName};
use crate::config::{Config, VendorEndpoints};
use crate::kernel::http::{with_retry, RetryPolicy};
use crate::kernel::{BaseJobSource, ResponseCache};

/// Outbound plumbing shared by all ingestors.
#[derive(Clone)]
pub struct SourceHttp {
    pub client: reqwest::Client,
    pub retry: RetryPolicy,
    pub cache: ResponseCache,
}

impl SourceHttp {
    pub fn new(client: reqwest::Client, retry: RetryPolicy, cache: ResponseCache) -> Self {
        Self {
            client,
            retry,
            cache,
        }
    }

    /// Send the request built by `build` and return the body of a 2xx response.
    pub async fn fetch_text<F>(&self, vendor: SourceName, build: F) -> Result<String, SourceError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder + Sync,
    {
        let client = &self.client;
        let build = &build;
        let body = with_retry(
            &self.retry,
            vendor.as_str(),
            SourceError::is_transient,
            move || async move {
                let resp = build(client)
                    .send()
                    .await
                    .map_err(|error| SourceError::Transport { vendor, error })?;
                let status = resp.status();
                let body = resp
                    .text()
                    .await
                    .map_err(|error| SourceError::Transport { vendor, error })?;
                if !status.is_success() {
                    return Err(SourceError::Status {
                        vendor,
                        status: status.as_u16(),
                        body,
                    });
                }
                Ok(body)
            },
        )
        .await?;

        self.cache.store(vendor, &body).await;
        Ok(body)
    }

    /// Run an Apify actor synchronously and return its raw dataset body.
    pub async fn run_actor<I: Serialize + Sync>(
        &self,
        vendor: SourceName,
        apify: &ApifyClient,
        actor_id: &str,
        input: &I,
    ) -> Result<String, SourceError> {
        let body = with_retry(&self.retry, vendor.as_str(), ApifyError::is_transient, move || {
            apify.run_sync_dataset(actor_id, input)
        })
        .await
        .map_err(|error| SourceError::Apify { vendor, error })?;

        self.cache.store(vendor, &body).await;
        Ok(body)
    }
}

/// Build every known source from configuration.
pub fn build_sources(config: &Config, http: SourceHttp) -> Vec<Arc<dyn BaseJobSource>> {
    build_sources_for(
        &config.endpoints,
        &config.rapid_api_key,
        &config.apify_api_key,
        http,
    )
}

pub fn build_sources_for(
    endpoints: &VendorEndpoints,
    rapid_api_key: &str,
    apify_api_key: &str,
    http: SourceHttp,
) -> Vec<Arc<dyn BaseJobSource>> {
    let apify = ApifyClient::with_client(
        http.client.clone(),
        apify_api_key.to_string(),
        endpoints.apify.clone(),
    );

    vec![
        Arc::new(JSearchIngestor::new(
            http.clone(),
            endpoints.jsearch.clone(),
            rapid_api_key.to_string(),
        )),
        Arc::new(LinkedInIngestor::new(
            http.clone(),
            endpoints.linkedin.clone(),
            rapid_api_key.to_string(),
        )),
        Arc::new(IndeedIngestor::new(http.clone(), apify.clone())),
        Arc::new(ApifyLinkedInIngestor::new(http, apify)),
    ]
}
