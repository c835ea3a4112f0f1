use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::source::SourceName;
use crate::kernel::http::RetryPolicy;

/// Operating mode. Dev points every vendor at the local stub server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Dev,
    Production,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Mode::Dev),
            "prod" | "production" => Ok(Mode::Production),
            other => bail!("MODE must be 'dev' or 'production', got '{}'", other),
        }
    }
}

/// Which company-branding lookup the persistence path runs for jobs without a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentPolicy {
    Disabled,
    LogoOnly,
    CompanyProfile,
}

/// Base URLs for every vendor the pipeline talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorEndpoints {
    pub jsearch: String,
    pub linkedin: String,
    pub apify: String,
    pub brandfetch: String,
}

impl VendorEndpoints {
    pub fn production() -> Self {
        Self {
            jsearch: "https://jsearch.p.rapidapi.com".to_string(),
            linkedin: "https://linkedin-job-search-api.p.rapidapi.com".to_string(),
            apify: apify_client::BASE_URL.to_string(),
            brandfetch: brandfetch_client::BASE_URL.to_string(),
        }
    }

    /// Paths mirror the real vendors under a per-vendor prefix on the stub server.
    pub fn stub(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            jsearch: format!("{}/jsearch", base),
            linkedin: format!("{}/linkedin", base),
            apify: format!("{}/apify/v2", base),
            brandfetch: format!("{}/brandfetch/v2", base),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mode: Mode,
    pub rapid_api_key: String,
    pub apify_api_key: String,
    pub brandfetch_api_key: Option<String>,
    pub enrichment: EnrichmentPolicy,
    pub api_key: String,
    pub cron_api_key: String,
    pub allowed_origins: Vec<String>,
    pub stub_port: u16,
    pub endpoints: VendorEndpoints,
    pub http_timeout: Duration,
    pub sync_timeout: Duration,
    pub retry: RetryPolicy,
    pub scheduled_sources: Vec<SourceName>,
    pub response_cache_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mode = match var("MODE") {
            Some(raw) => raw.parse()?,
            None => {
                tracing::warn!("MODE not set, defaulting to dev");
                Mode::Dev
            }
        };

        let database_url = var("DATABASE_URL")
            .or_else(|| var("POSTGRES_CONNECTION"))
            .context("DATABASE_URL must be set")?;

        let port = parse_or(var("PORT"), 8080u16).context("PORT must be a valid number")?;
        let stub_port =
            parse_or(var("STUB_PORT"), 8081u16).context("STUB_PORT must be a valid number")?;

        let api_key = var("API_KEY").context("API_KEY must be set")?;
        let cron_api_key = var("CRON_API_KEY").unwrap_or_else(|| api_key.clone());

        let brandfetch_api_key = var("BRANDFETCH_API_KEY");
        let enrichment = match (mode, &brandfetch_api_key) {
            (Mode::Production, Some(_)) => match var("ENRICHMENT").as_deref() {
                None | Some("profile") => EnrichmentPolicy::CompanyProfile,
                Some("logo") => EnrichmentPolicy::LogoOnly,
                Some("off") => EnrichmentPolicy::Disabled,
                Some(other) => {
                    bail!("ENRICHMENT must be 'profile', 'logo' or 'off', got '{}'", other)
                }
            },
            _ => EnrichmentPolicy::Disabled,
        };

        let mut endpoints = match mode {
            Mode::Production => VendorEndpoints::production(),
            Mode::Dev => VendorEndpoints::stub(&format!("http://localhost:{}", stub_port)),
        };
        if let Some(url) = var("JSEARCH_BASE_URL") {
            endpoints.jsearch = url;
        }
        if let Some(url) = var("LINKEDIN_BASE_URL") {
            endpoints.linkedin = url;
        }
        if let Some(url) = var("APIFY_BASE_URL") {
            endpoints.apify = url;
        }
        if let Some(url) = var("BRANDFETCH_BASE_URL") {
            endpoints.brandfetch = url;
        }

        let http_timeout = Duration::from_secs(
            parse_or(var("HTTP_TIMEOUT_SECS"), 180u64)
                .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
        );
        let sync_timeout = Duration::from_secs(
            parse_or(var("SYNC_TIMEOUT_SECS"), 300u64)
                .context("SYNC_TIMEOUT_SECS must be a number of seconds")?,
        );
        let retry = RetryPolicy {
            max_attempts: parse_or(var("HTTP_MAX_ATTEMPTS"), 3u32)
                .context("HTTP_MAX_ATTEMPTS must be a number")?
                .max(1),
            ..RetryPolicy::default()
        };

        let scheduled_sources = match var("SCHEDULED_SOURCES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(SourceName::from_str)
                .collect::<Result<Vec<_>, _>>()
                .context("SCHEDULED_SOURCES contains an unknown source")?,
            None => SourceName::DEFAULT_SCHEDULED.to_vec(),
        };

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            database_url,
            port,
            mode,
            rapid_api_key: var("RAPID_API_KEY").unwrap_or_default(),
            apify_api_key: var("APIFY_API_KEY").unwrap_or_default(),
            brandfetch_api_key,
            enrichment,
            api_key,
            cron_api_key,
            allowed_origins,
            stub_port,
            endpoints,
            http_timeout,
            sync_timeout,
            retry,
            scheduled_sources,
            response_cache_dir: var("RESPONSE_CACHE_DIR").map(PathBuf::from),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => Ok(v.trim().parse()?),
        None => Ok(default),
    }
}
