//! Local stand-in for the job vendors and Brandfetch.
//!
//! Serves fixed sample payloads on the same paths as the real APIs, under a
//! per-vendor prefix (see [`VendorEndpoints::stub`](crate::config::VendorEndpoints::stub)).

use axum::{
    extract::Path,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::debug;

const JSEARCH_FIXTURE: &str = include_str!("../../fixtures/jsearch.json");
const LINKEDIN_FIXTURE: &str = include_str!("../../fixtures/linkedin.json");
const INDEED_FIXTURE: &str = include_str!("../../fixtures/indeed.json");
const APIFY_LINKEDIN_FIXTURE: &str = include_str!("../../fixtures/apify_linkedin.json");

/// Router with every stubbed vendor endpoint.
pub fn stub_router() -> Router {
    Router::new()
        .route("/jsearch/search", get(jsearch_search))
        .route("/linkedin/active-jb-7d", get(linkedin_active_jobs))
        .route(
            "/apify/v2/acts/:actor/run-sync-get-dataset-items",
            post(apify_run_sync),
        )
        .route("/brandfetch/v2/brands/:domain", get(brandfetch_brand))
        .layer(TraceLayer::new_for_http())
}

fn json_body(body: &'static str) -> Response {
    ([(CONTENT_TYPE, "application/json")], body).into_response()
}

fn has_header(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.is_empty())
}

async fn jsearch_search(headers: HeaderMap) -> Response {
    if !has_header(&headers, "x-rapidapi-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status": "ERROR",
                "error": {"message": "Missing RapidAPI key", "code": 401}
            })),
        )
            .into_response();
    }
    json_body(JSEARCH_FIXTURE)
}

async fn linkedin_active_jobs(headers: HeaderMap) -> Response {
    if !has_header(&headers, "x-rapidapi-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "You are not subscribed to this API."})),
        )
            .into_response();
    }
    json_body(LINKEDIN_FIXTURE)
}

async fn apify_run_sync(Path(actor): Path<String>) -> Response {
    debug!(actor = %actor, "Stub actor run");
    match actor.as_str() {
        apify_client::INDEED_SCRAPER => json_body(INDEED_FIXTURE),
        apify_client::LINKEDIN_JOBS_SCRAPER => json_body(APIFY_LINKEDIN_FIXTURE),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"type": "record-not-found", "message": "Actor was not found"}})),
        )
            .into_response(),
    }
}

/// A brand document derived from the domain, so every lookup succeeds.
async fn brandfetch_brand(Path(domain): Path<String>) -> Response {
    let name = domain.split('.').next().unwrap_or_default();
    let mut chars = name.chars();
    let name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return StatusCode::NOT_FOUND.into_response(),
    };

    let cdn = format!("https://cdn.brandfetch.io/{}", domain);
    Json(json!({
        "id": format!("stub-{}", domain),
        "name": name,
        "domain": domain,
        "description": format!("{} builds software in Nigeria.", name),
        "links": [
            {"name": "website", "url": format!("https://{}", domain)},
            {"name": "linkedin", "url": format!("https://www.linkedin.com/company/{}", domain)}
        ],
        "logos": [
            {
                "type": "icon",
                "theme": "light",
                "formats": [{"src": format!("{}/icon.png", cdn), "format": "png"}]
            },
            {
                "type": "logo",
                "theme": "light",
                "formats": [{"src": format!("{}/logo.svg", cdn), "format": "svg"}]
            }
        ],
        "colors": [
            {"hex": "#0B2447", "type": "dark"},
            {"hex": "#19A7CE", "type": "accent"}
        ],
        "company": {
            "industries": [{"name": "Software Development"}, {"name": "Financial Services"}]
        }
    }))
    .into_response()
}
