//! Read-through cache over Brandfetch brand documents.

use anyhow::{Context, Result};
use brandfetch_client::BrandfetchClient;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use url::Url;

use crate::domains::companies::models::{company_key, CompanyDetails};

/// Domain to look a company up by.
///
/// Uses the host of `company_url` (with or without a scheme), minus any `www.`
/// prefix. Without a usable URL the name is slugged into a `.com` guess.
pub fn derive_brand_domain(company_name: &str, company_url: &str) -> String {
    let company_url = company_url.trim();
    let host = if company_url.is_empty() {
        None
    } else {
        url_host(company_url).or_else(|| url_host(&format!("https://{}", company_url)))
    };

    let domain = host.unwrap_or_else(|| {
        let slug = company_name
            .trim()
            .to_lowercase()
            .replace(' ', "-")
            .replace('&', "and");
        format!("{}.com", slug)
    });

    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    domain.split('/').next().unwrap_or_default().to_string()
}

fn url_host(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()?
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}

/// Cached branding details for a company, fetching and storing them on a miss.
///
/// Lookup and fetch failures are errors; failing to store a fetched document
/// only logs, since the caller can still use it.
pub async fn get_or_fetch_company_details(
    company_name: &str,
    company_url: &str,
    pool: &PgPool,
    client: &BrandfetchClient,
) -> Result<CompanyDetails> {
    let key = company_key(company_name);

    if let Some(cached) = CompanyDetails::find_latest_by_company_id(&key, pool)
        .await
        .context("Failed to read company details cache")?
    {
        debug!(company = %key, "Company details cache hit");
        return Ok(cached);
    }

    let domain = derive_brand_domain(company_name, company_url);
    info!(company = %key, domain = %domain, "Fetching company details from Brandfetch");
    let brand = client
        .fetch_brand(&domain)
        .await
        .with_context(|| format!("Brandfetch lookup failed for {}", domain))?;

    let details = CompanyDetails::from_brand(company_name, &domain, &brand);
    if let Err(e) = details.insert(pool).await {
        warn!(error = %e, company = %key, "Failed to cache company details");
    }

    Ok(details)
}
