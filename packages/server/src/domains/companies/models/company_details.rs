use anyhow::Result;
use brandfetch_client::{BrandDocument, BrandLink};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Lookup key for a company: its name, trimmed and lower-cased.
pub fn company_key(company_name: &str) -> String {
    company_name.trim().to_lowercase()
}

/// Branding details for one company, as last fetched from Brandfetch.
///
/// Rows are insert-only; readers take the most recently updated row for a key.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CompanyDetails {
    pub id: Uuid,
    pub company_id: String,
    pub name: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub icon_url: Option<String>,
    pub accent_color: Option<String>,
    pub industry: Json<Vec<String>>,
    pub links: Json<Vec<BrandLink>>,
    #[serde(skip_serializing)]
    pub raw_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyDetails {
    /// Build a cache row from a freshly fetched brand document. Missing pieces
    /// stay empty; the display name falls back to the name we searched for.
    pub fn from_brand(company_name: &str, domain: &str, brand: &BrandDocument) -> Self {
        let profile = brand.profile();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id: company_key(company_name),
            name: profile.name.or_else(|| Some(company_name.trim().to_string())),
            domain: Some(domain.to_string()),
            description: profile.description,
            logo_url: profile.logo_url,
            icon_url: profile.icon_url,
            accent_color: profile.accent_color,
            industry: Json(profile.industries),
            links: Json(profile.links),
            raw_data: Some(brand.raw.clone()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Best image for a job card: the logo, else the square icon.
    pub fn display_logo(&self) -> Option<&str> {
        self.logo_url
            .as_deref()
            .or(self.icon_url.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub async fn find_latest_by_company_id(
        company_id: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, company_id, name, domain, description, logo_url, icon_url, accent_color,
                   industry, links, raw_data, created_at, updated_at
            FROM company_details
            WHERE company_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO company_details (
                id, company_id, name, domain, description, logo_url, icon_url, accent_color,
                industry, links, raw_data, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(self.id)
        .bind(&self.company_id)
        .bind(&self.name)
        .bind(&self.domain)
        .bind(&self.description)
        .bind(&self.logo_url)
        .bind(&self.icon_url)
        .bind(&self.accent_color)
        .bind(&self.industry)
        .bind(&self.links)
        .bind(&self.raw_data)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}
