//! Pure Brandfetch API client.
//!
//! Looks up brand documents by domain and extracts the pieces a job board
//! cares about (logo, icon, accent colour, links, industries).
//!
//! # Example
//!
//! ```rust,ignore
//! use brandfetch_client::BrandfetchClient;
//!
//! let client = BrandfetchClient::new("your-api-key".into());
//! if let Some(logo) = client.fetch_logo("paystack.com").await? {
//!     println!("{logo}");
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{BrandfetchError, Result};
pub use types::{first_logo_src, BrandLink, BrandProfile};

use std::time::Duration;

pub const BASE_URL: &str = "https://api.brandfetch.io/v2";

/// Brand lookups sit on the ingestion path, so they get a short deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A brand document as returned by the API, kept raw for caching.
#[derive(Debug, Clone)]
pub struct BrandDocument {
    pub raw: String,
    pub value: serde_json::Value,
}

impl BrandDocument {
    pub fn profile(&self) -> BrandProfile {
        BrandProfile::from_value(&self.value)
    }
}

#[derive(Clone)]
pub struct BrandfetchClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl BrandfetchClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(client, api_key, BASE_URL.to_string())
    }

    pub fn with_client(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full brand document for a bare domain such as `paystack.com`.
    pub async fn fetch_brand(&self, domain: &str) -> Result<BrandDocument> {
        let url = format!("{}/brands/{}", self.base_url, domain);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BrandfetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let raw = resp.text().await?;
        let value = serde_json::from_str(&raw)?;
        tracing::debug!(domain, "Fetched brand document");
        Ok(BrandDocument { raw, value })
    }

    /// Fetch only the first logo asset for a domain.
    pub async fn fetch_logo(&self, domain: &str) -> Result<Option<String>> {
        let brand = self.fetch_brand(domain).await?;
        Ok(first_logo_src(&brand.value))
    }
}
