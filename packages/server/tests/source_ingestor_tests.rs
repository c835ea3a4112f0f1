//! Every ingestor against the local vendor stub, end to end over HTTP.

mod common;

use std::sync::Arc;

use crate::common::spawn_stub_server;
use jobboard_core::config::VendorEndpoints;
use jobboard_core::domains::source::ingestors::{build_sources_for, SourceHttp};
use jobboard_core::domains::source::{SourceError, SourceName};
use jobboard_core::kernel::{BaseJobSource, ResponseCache, RetryPolicy};

async fn stub_sources(rapid_api_key: &str) -> Vec<Arc<dyn BaseJobSource>> {
    let base = spawn_stub_server().await;
    let http = SourceHttp::new(
        reqwest::Client::new(),
        RetryPolicy::no_retry(),
        ResponseCache::disabled(),
    );
    build_sources_for(&VendorEndpoints::stub(&base), rapid_api_key, "test-apify-token", http)
}

fn source(sources: &[Arc<dyn BaseJobSource>], name: SourceName) -> Arc<dyn BaseJobSource> {
    sources
        .iter()
        .find(|s| s.name() == name)
        .cloned()
        .expect("source is built")
}

#[tokio::test]
async fn builds_one_ingestor_per_source() {
    let sources = stub_sources("test-rapid-key").await;
    let mut names: Vec<SourceName> = sources.iter().map(|s| s.name()).collect();
    names.sort();
    let mut expected = vec![
        SourceName::JSearch,
        SourceName::LinkedIn,
        SourceName::Indeed,
        SourceName::ApifyLinkedIn,
    ];
    expected.sort();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn jsearch_fetches_from_stub() {
    let sources = stub_sources("test-rapid-key").await;
    let jobs = source(&sources, SourceName::JSearch).fetch_jobs().await.unwrap();

    assert_eq!(jobs.len(), 3);
    assert!(jobs.iter().all(|j| j.source == "jsearch"));
    assert!(jobs.iter().all(|j| j.exp_date > j.date_gotten));
    assert_eq!(jobs[0].id, "jsearch:Xk3bq2AAAAA");
    assert_eq!(jobs[0].location, "Lagos, Lagos, NG");
    assert_eq!(jobs[1].location, "Remote, Nigeria");
    assert!(jobs[1].is_remote);
}

#[tokio::test]
async fn linkedin_fetches_from_stub() {
    let sources = stub_sources("test-rapid-key").await;
    let jobs = source(&sources, SourceName::LinkedIn).fetch_jobs().await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "linkedin:1402231");
    assert_eq!(jobs[0].company, "Flutterwave");
    assert_eq!(jobs[1].description, "Kuda is the money app for Africans.");
    assert_eq!(jobs[1].job_type, "FULL_TIME, CONTRACTOR");
}

#[tokio::test]
async fn indeed_runs_actor_on_stub() {
    let sources = stub_sources("test-rapid-key").await;
    let jobs = source(&sources, SourceName::Indeed).fetch_jobs().await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "indeed:5f1c0e2a9b");
    assert_eq!(jobs[0].company_url, "https://andela.com");
    assert!(jobs[0].is_remote);
    assert!(jobs[1].company_logo.is_empty());
}

#[tokio::test]
async fn apify_linkedin_runs_actor_on_stub() {
    let sources = stub_sources("test-rapid-key").await;
    let jobs = source(&sources, SourceName::ApifyLinkedIn).fetch_jobs().await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "apify_linkedin:3912345678");
    assert_eq!(jobs[1].company_url, "https://remotefirst.io");
    assert!(jobs[1].is_remote);
}

#[tokio::test]
async fn vendor_rejection_surfaces_as_status_error() {
    let sources = stub_sources("").await;
    let err = source(&sources, SourceName::JSearch).fetch_jobs().await.unwrap_err();

    assert!(matches!(err, SourceError::Status { status: 401, .. }));
    assert!(!err.is_transient());
    assert_eq!(err.vendor(), SourceName::JSearch);
}

#[tokio::test]
async fn unreachable_vendor_is_transport_error() {
    // Nothing listens on port 9 of localhost
    let http = SourceHttp::new(
        reqwest::Client::new(),
        RetryPolicy::no_retry(),
        ResponseCache::disabled(),
    );
    let sources = build_sources_for(
        &VendorEndpoints::stub("http://127.0.0.1:9"),
        "test-rapid-key",
        "test-apify-token",
        http,
    );

    let err = source(&sources, SourceName::LinkedIn).fetch_jobs().await.unwrap_err();
    assert!(matches!(err, SourceError::Transport { .. }));
}
