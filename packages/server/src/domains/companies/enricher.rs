//! Company logo enrichment for the persistence path.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use brandfetch_client::{BrandfetchClient, DEFAULT_TIMEOUT};
use sqlx::PgPool;

use super::activities::{derive_brand_domain, get_or_fetch_company_details};
use crate::config::{Config, EnrichmentPolicy};
use crate::kernel::http::build_http_client;
use crate::kernel::BaseCompanyEnricher;

/// Enrichment switched off (dev mode, or no Brandfetch key).
pub struct NoopEnricher;

#[async_trait]
impl BaseCompanyEnricher for NoopEnricher {
    async fn find_logo(&self, _company: &str, _company_url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

pub struct BrandfetchEnricher {
    pool: PgPool,
    client: BrandfetchClient,
    policy: EnrichmentPolicy,
}

impl BrandfetchEnricher {
    pub fn new(pool: PgPool, client: BrandfetchClient, policy: EnrichmentPolicy) -> Self {
        Self {
            pool,
            client,
            policy,
        }
    }
}

#[async_trait]
impl BaseCompanyEnricher for BrandfetchEnricher {
    async fn find_logo(&self, company: &str, company_url: &str) -> Result<Option<String>> {
        match self.policy {
            EnrichmentPolicy::Disabled => Ok(None),
            EnrichmentPolicy::LogoOnly => {
                let domain = derive_brand_domain(company, company_url);
                Ok(self.client.fetch_logo(&domain).await?)
            }
            EnrichmentPolicy::CompanyProfile => {
                let details =
                    get_or_fetch_company_details(company, company_url, &self.pool, &self.client)
                        .await?;
                Ok(details.display_logo().map(str::to_string))
            }
        }
    }
}

/// Pick the enricher configuration asks for.
pub fn build_enricher(config: &Config, pool: PgPool) -> Result<Arc<dyn BaseCompanyEnricher>> {
    match (config.enrichment, &config.brandfetch_api_key) {
        (EnrichmentPolicy::Disabled, _) | (_, None) => {
            tracing::info!("Company enrichment disabled");
            Ok(Arc::new(NoopEnricher))
        }
        (policy, Some(key)) => {
            tracing::info!(?policy, "Company enrichment enabled");
            let http = build_http_client(DEFAULT_TIMEOUT)?;
            let client = BrandfetchClient::with_client(
                http,
                key.clone(),
                config.endpoints.brandfetch.clone(),
            );
            Ok(Arc::new(BrandfetchEnricher::new(pool, client, policy)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_enricher_finds_nothing() {
        let logo = NoopEnricher.find_logo("Paystack", "https://paystack.com").await.unwrap();
        assert!(logo.is_none());
    }
}
