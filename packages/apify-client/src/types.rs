use serde::{Deserialize, Deserializer, Serialize};

/// Scrapers emit `null` for empty lists and flags.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Input for the misceres/indeed-scraper actor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndeedScraperInput {
    pub country: String,
    pub follow_apply_redirects: bool,
    pub max_items: u32,
    pub parse_company_details: bool,
    pub position: String,
    pub save_only_unique_items: bool,
    pub force_response_encoding: String,
}

impl IndeedScraperInput {
    pub fn new(position: impl Into<String>, country: impl Into<String>, max_items: u32) -> Self {
        Self {
            country: country.into(),
            follow_apply_redirects: false,
            max_items,
            parse_company_details: true,
            position: position.into(),
            save_only_unique_items: true,
            force_response_encoding: "utf-8".to_string(),
        }
    }
}

/// A single job posting from the Indeed scraper dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndeedJob {
    pub id: Option<String>,
    pub position_name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub posted_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub job_type: Vec<String>,
    pub url: Option<String>,
    pub scraped_at: Option<String>,
    pub posting_date_parsed: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_expired: bool,
    pub company_info: Option<IndeedCompanyInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndeedCompanyInfo {
    pub indeed_url: Option<String>,
    pub url: Option<String>,
    pub company_description: Option<String>,
    pub company_logo: Option<String>,
}

/// Input for the curious_coder/linkedin-jobs-scraper actor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInScraperInput {
    pub urls: Vec<String>,
    pub scrape_company: bool,
    pub force_response_encoding: String,
    pub max_items: u32,
}

impl LinkedInScraperInput {
    pub fn new(search_url: impl Into<String>, max_items: u32) -> Self {
        Self {
            urls: vec![search_url.into()],
            scrape_company: true,
            force_response_encoding: "utf-8".to_string(),
            max_items,
        }
    }
}

/// A single job posting from the LinkedIn jobs scraper dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedInJob {
    pub id: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub company_linkedin_url: Option<String>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub salary_info: Vec<String>,
    pub posted_at: Option<String>,
    pub description_text: Option<String>,
    pub employment_type: Option<String>,
    pub company_address: Option<CompanyAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyAddress {
    pub address_locality: Option<String>,
    pub address_region: Option<String>,
    pub address_country: Option<String>,
}

/// Actors report input or quota problems as a one-element dataset carrying an
/// `error` string instead of failing the HTTP request.
#[derive(Debug, Clone, Deserialize)]
struct DatasetErrorItem {
    error: String,
}

/// Returns the actor's error message if `body` is an error dataset.
pub fn dataset_error(body: &str) -> Option<String> {
    let items: Vec<serde_json::Value> = serde_json::from_str(body).ok()?;
    let first = items.into_iter().next()?;
    serde_json::from_value::<DatasetErrorItem>(first)
        .ok()
        .map(|item| item.error)
}
