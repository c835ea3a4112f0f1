//! Integration tests for the Brandfetch read-through cache and enrichers,
//! against the local vendor stub.

mod common;

use crate::common::{spawn_stub_server, unique_company, TestHarness};
use brandfetch_client::BrandfetchClient;
use jobboard_core::config::EnrichmentPolicy;
use jobboard_core::domains::companies::activities::get_or_fetch_company_details;
use jobboard_core::domains::companies::models::company_key;
use jobboard_core::domains::companies::{BrandfetchEnricher, CompanyDetails};
use jobboard_core::kernel::BaseCompanyEnricher;
use test_context::test_context;

async fn stub_brandfetch() -> BrandfetchClient {
    let base = spawn_stub_server().await;
    BrandfetchClient::with_client(
        reqwest::Client::new(),
        "test-brandfetch-key".to_string(),
        format!("{}/brandfetch/v2", base),
    )
}

#[test_context(TestHarness)]
#[tokio::test]
async fn miss_fetches_and_stores_then_hit_reads_cache(ctx: &TestHarness) {
    let client = stub_brandfetch().await;
    let company = unique_company("Paystack");

    let fetched = get_or_fetch_company_details(
        &company,
        "https://www.paystack.com/careers",
        &ctx.db_pool,
        &client,
    )
    .await
    .unwrap();
    assert_eq!(fetched.company_id, company_key(&company));
    assert_eq!(fetched.domain.as_deref(), Some("paystack.com"));
    assert_eq!(fetched.name.as_deref(), Some("Paystack"));
    assert_eq!(fetched.accent_color.as_deref(), Some("#19A7CE"));
    assert_eq!(fetched.industry.0, vec!["Software Development", "Financial Services"]);
    assert_eq!(
        fetched.display_logo(),
        Some("https://cdn.brandfetch.io/paystack.com/logo.svg")
    );

    let stored = CompanyDetails::find_latest_by_company_id(&company_key(&company), &ctx.db_pool)
        .await
        .unwrap()
        .expect("details cached");
    assert_eq!(stored.id, fetched.id);

    // Case and whitespace variants of the name hit the same row
    let variant = format!("  {}  ", company.to_uppercase());
    let cached = get_or_fetch_company_details(&variant, "", &ctx.db_pool, &client)
        .await
        .unwrap();
    assert_eq!(cached.id, fetched.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn newest_cached_row_wins(ctx: &TestHarness) {
    let client = stub_brandfetch().await;
    let company = unique_company("Kuda");

    let older = get_or_fetch_company_details(&company, "kuda.com", &ctx.db_pool, &client)
        .await
        .unwrap();

    let mut newer = older.clone();
    newer.id = uuid::Uuid::new_v4();
    newer.logo_url = Some("https://cdn.example/kuda-2024.svg".to_string());
    newer.updated_at = older.updated_at + chrono::Duration::seconds(30);
    newer.insert(&ctx.db_pool).await.unwrap();

    let found = get_or_fetch_company_details(&company, "kuda.com", &ctx.db_pool, &client)
        .await
        .unwrap();
    assert_eq!(found.id, newer.id);
    assert_eq!(found.display_logo(), Some("https://cdn.example/kuda-2024.svg"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn enricher_policies_pick_the_right_asset(ctx: &TestHarness) {
    let company = unique_company("Andela");

    let logo_only = BrandfetchEnricher::new(
        ctx.db_pool.clone(),
        stub_brandfetch().await,
        EnrichmentPolicy::LogoOnly,
    );
    let logo = logo_only.find_logo(&company, "https://andela.com").await.unwrap();
    // First asset in the document, whatever its type
    assert_eq!(logo.as_deref(), Some("https://cdn.brandfetch.io/andela.com/icon.png"));
    assert!(
        CompanyDetails::find_latest_by_company_id(&company_key(&company), &ctx.db_pool)
            .await
            .unwrap()
            .is_none()
    );

    let profile = BrandfetchEnricher::new(
        ctx.db_pool.clone(),
        stub_brandfetch().await,
        EnrichmentPolicy::CompanyProfile,
    );
    let logo = profile.find_logo(&company, "https://andela.com").await.unwrap();
    assert_eq!(logo.as_deref(), Some("https://cdn.brandfetch.io/andela.com/logo.svg"));

    let disabled = BrandfetchEnricher::new(
        ctx.db_pool.clone(),
        stub_brandfetch().await,
        EnrichmentPolicy::Disabled,
    );
    assert!(disabled.find_logo(&company, "https://andela.com").await.unwrap().is_none());
}
