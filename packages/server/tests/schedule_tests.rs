//! Integration tests for run-state persistence and the ingestion scheduler.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crate::common::{go_job, listings_for, unique_company, TestHarness};
use jobboard_core::domains::schedules::{JobScheduleInfo, PgScheduleStore, RunRecord, RunStatus};
use jobboard_core::domains::source::SourceName;
use jobboard_core::kernel::{
    BaseJobSource, BaseScheduleStore, InMemoryScheduleStore, IngestionScheduler,
    MockCompanyEnricher, MockJobSource, ServerDeps,
};
use sqlx::PgPool;
use test_context::test_context;

fn deps_with(
    pool: &PgPool,
    sources: Vec<Arc<dyn BaseJobSource>>,
    store: InMemoryScheduleStore,
) -> ServerDeps {
    ServerDeps::new(
        pool.clone(),
        sources,
        Arc::new(MockCompanyEnricher::new()),
        Arc::new(store),
        Duration::from_secs(30),
    )
}

/// Poll until `source` leaves `Scheduled`/`Running`, or give up.
async fn wait_for_outcome(store: &InMemoryScheduleStore, source: SourceName) -> JobScheduleInfo {
    for _ in 0..100 {
        if let Some(row) = store.get(source) {
            if !matches!(row.status, RunStatus::Scheduled | RunStatus::Running) {
                return row;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("{} never finished a run", source);
}

fn assert_close(actual: DateTime<Utc>, expected: DateTime<Utc>) {
    let drift = (actual - expected).num_seconds().abs();
    assert!(drift <= 5, "expected ~{}, got {}", expected, actual);
}

// =============================================================================
// Postgres run-state
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn postgres_store_tracks_a_run_lifecycle(ctx: &TestHarness) {
    let store = PgScheduleStore::new(ctx.db_pool.clone());
    let source = SourceName::LinkedIn;
    let planned = Utc::now() + chrono::Duration::hours(1);

    store.ensure_scheduled(source, planned).await.unwrap();
    let row = JobScheduleInfo::find_by_source(source, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::Scheduled);
    assert_eq!(row.interval_hours, 24);
    assert_close(row.next_run_time.unwrap(), planned);

    let started = Utc::now();
    store.mark_running(source, started).await.unwrap();
    let row = JobScheduleInfo::find_by_source(source, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::Running);
    assert_close(row.next_run_time.unwrap(), planned);

    let next = started + source.interval();
    store
        .record_run(&RunRecord {
            source,
            status: RunStatus::PartialSuccess,
            ran_at: started,
            count: 7,
            error: Some("database error after 7 records".to_string()),
            next_run: Some(next),
        })
        .await
        .unwrap();
    let row = JobScheduleInfo::find_by_source(source, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::PartialSuccess);
    assert_eq!(row.last_run_count, 7);
    assert_close(row.next_run_time.unwrap(), next);

    // Manual runs keep the stored due time
    store
        .record_run(&RunRecord {
            source,
            status: RunStatus::Success,
            ran_at: Utc::now(),
            count: 3,
            error: None,
            next_run: None,
        })
        .await
        .unwrap();
    let row = JobScheduleInfo::find_by_source(source, &ctx.db_pool).await.unwrap().unwrap();
    assert_eq!(row.status, RunStatus::Success);
    assert!(row.last_error_msg.is_none());
    assert_close(row.next_run_time.unwrap(), next);

    let shutdown_at = Utc::now() + chrono::Duration::hours(5);
    store.set_next_run(source, shutdown_at).await.unwrap();
    let rows = store.load_all().await.unwrap();
    let row = rows.iter().find(|r| r.source() == Some(source)).unwrap();
    assert_close(row.next_run_time.unwrap(), shutdown_at);
}

// =============================================================================
// Scheduler
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread")]
async fn due_source_runs_and_records_success(ctx: &TestHarness) {
    let company = unique_company("Paystack");
    let job = go_job(SourceName::Indeed, &company, "Golang Engineer", &company, None);
    let source = Arc::new(MockJobSource::new(SourceName::Indeed).with_jobs(vec![job]));

    let soon = Utc::now() + chrono::Duration::seconds(2);
    let store = InMemoryScheduleStore::new().with_next_run(SourceName::Indeed, Some(soon));
    let deps = deps_with(
        &ctx.db_pool,
        vec![source.clone() as Arc<dyn BaseJobSource>],
        store.clone(),
    );

    let scheduler = IngestionScheduler::new(deps).await.unwrap();
    scheduler.start(&[SourceName::Indeed]).await.unwrap();

    let row = wait_for_outcome(&store, SourceName::Indeed).await;
    assert_eq!(row.status, RunStatus::Success);
    assert_eq!(row.last_run_count, 1);
    assert_close(
        row.next_run_time.unwrap(),
        row.last_run_time.unwrap() + chrono::Duration::hours(24),
    );
    assert_eq!(source.call_count(), 1);
    assert_eq!(listings_for(&company, &ctx.db_pool).await.len(), 1);

    // The next trigger is already armed a full interval out
    let next_tick = scheduler.next_tick(SourceName::Indeed).await.unwrap().unwrap();
    assert_close(next_tick, Utc::now() + chrono::Duration::hours(24));

    scheduler.shutdown().await.unwrap();
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread")]
async fn failing_source_does_not_block_the_others(ctx: &TestHarness) {
    let soon = Some(Utc::now() + chrono::Duration::seconds(1));
    let failing = Arc::new(MockJobSource::new(SourceName::JSearch).with_error("quota exceeded"));
    let healthy = Arc::new(MockJobSource::new(SourceName::ApifyLinkedIn));

    let store = InMemoryScheduleStore::new()
        .with_next_run(SourceName::JSearch, soon)
        .with_next_run(SourceName::ApifyLinkedIn, soon);
    let deps = deps_with(
        &ctx.db_pool,
        vec![failing.clone() as Arc<dyn BaseJobSource>, healthy.clone()],
        store.clone(),
    );

    let scheduler = IngestionScheduler::new(deps).await.unwrap();
    scheduler
        .start(&[SourceName::JSearch, SourceName::ApifyLinkedIn])
        .await
        .unwrap();

    let failed = wait_for_outcome(&store, SourceName::JSearch).await;
    assert_eq!(failed.status, RunStatus::Failed);
    assert!(failed.last_error_msg.unwrap().contains("quota exceeded"));
    assert_close(
        failed.next_run_time.unwrap(),
        failed.last_run_time.unwrap() + chrono::Duration::hours(12),
    );

    let ok = wait_for_outcome(&store, SourceName::ApifyLinkedIn).await;
    assert_eq!(ok.status, RunStatus::Success);
    assert_eq!(ok.last_run_count, 0);

    scheduler.shutdown().await.unwrap();
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread")]
async fn restart_honours_persisted_due_time_and_shutdown_saves_it(ctx: &TestHarness) {
    let due = Utc::now() + chrono::Duration::hours(3);
    let store = InMemoryScheduleStore::new().with_next_run(SourceName::Indeed, Some(due));
    let source = Arc::new(MockJobSource::new(SourceName::Indeed));
    let deps = deps_with(
        &ctx.db_pool,
        vec![source.clone() as Arc<dyn BaseJobSource>],
        store.clone(),
    );

    let scheduler = IngestionScheduler::new(deps).await.unwrap();
    scheduler.start(&[SourceName::Indeed]).await.unwrap();

    let next_tick = scheduler.next_tick(SourceName::Indeed).await.unwrap().unwrap();
    assert_close(next_tick, due);

    scheduler.shutdown().await.unwrap();
    let persisted = store.get(SourceName::Indeed).unwrap();
    assert_close(persisted.next_run_time.unwrap(), due);
    assert_eq!(source.call_count(), 0);
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread")]
async fn new_and_overdue_sources_are_planned_on_start(ctx: &TestHarness) {
    let overdue_at = Utc::now() - chrono::Duration::days(2);
    let store = InMemoryScheduleStore::new().with_next_run(SourceName::Indeed, Some(overdue_at));
    let sources: Vec<Arc<dyn BaseJobSource>> = vec![
        Arc::new(MockJobSource::new(SourceName::Indeed)),
        Arc::new(MockJobSource::new(SourceName::JSearch)),
    ];
    let deps = deps_with(&ctx.db_pool, sources, store.clone());

    let scheduler = IngestionScheduler::new(deps).await.unwrap();
    // LinkedIn has no ingestor here and is skipped
    let requested = [SourceName::Indeed, SourceName::JSearch, SourceName::LinkedIn];
    scheduler.start(&requested).await.unwrap();

    let overdue = store.get(SourceName::Indeed).unwrap();
    assert_eq!(overdue.status, RunStatus::Scheduled);
    let in_a_minute = Utc::now() + chrono::Duration::minutes(1);
    assert_close(overdue.next_run_time.unwrap(), in_a_minute);

    let fresh = store.get(SourceName::JSearch).unwrap();
    assert_eq!(fresh.status, RunStatus::Scheduled);
    assert_eq!(fresh.interval_hours, 12);
    let in_an_hour = Utc::now() + chrono::Duration::hours(1);
    assert_close(fresh.next_run_time.unwrap(), in_an_hour);

    assert!(store.get(SourceName::LinkedIn).is_none());
    assert!(scheduler.next_tick(SourceName::LinkedIn).await.unwrap().is_none());

    scheduler.shutdown().await.unwrap();
}

// =============================================================================
// Run budget
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn fetch_exceeding_budget_is_recorded_as_failed(ctx: &TestHarness) {
    let store = InMemoryScheduleStore::new();
    let slow = Arc::new(
        MockJobSource::new(SourceName::LinkedIn).with_delay(Duration::from_secs(5)),
    );
    let deps = ServerDeps::new(
        ctx.db_pool.clone(),
        vec![slow as Arc<dyn BaseJobSource>],
        Arc::new(MockCompanyEnricher::new()),
        Arc::new(store.clone()),
        Duration::from_millis(200),
    );

    let outcome = deps.run_source(SourceName::LinkedIn, None).await.unwrap();
    assert_eq!(outcome.status, RunStatus::Failed);
    assert!(outcome.error.unwrap().contains("timed out"));

    let row = store.get(SourceName::LinkedIn).unwrap();
    assert_eq!(row.status, RunStatus::Failed);
    assert_eq!(row.last_run_count, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn running_a_source_without_an_ingestor_is_an_error(ctx: &TestHarness) {
    let deps = deps_with(&ctx.db_pool, vec![], InMemoryScheduleStore::new());
    assert!(deps.run_source(SourceName::Indeed, None).await.is_err());
}
