// Test doubles for the kernel traits
//
// Mock sources, enrichers and an in-memory run-state store so the pipeline
// and scheduler can be exercised without vendors (and, for the scheduler,
// without a database).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{BaseCompanyEnricher, BaseJobSource, BaseScheduleStore};
use crate::domains::jobs::Job;
use crate::domains::schedules::{JobScheduleInfo, RunRecord, RunStatus};
use crate::domains::source::{SourceError, SourceName};

// =============================================================================
// Mock Job Source
// =============================================================================

pub struct MockJobSource {
    name: SourceName,
    responses: Arc<Mutex<Vec<std::result::Result<Vec<Job>, String>>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockJobSource {
    pub fn new(name: SourceName) -> Self {
        Self {
            name,
            responses: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a batch for the next fetch.
    pub fn with_jobs(self, jobs: Vec<Job>) -> Self {
        self.responses.lock().unwrap().push(Ok(jobs));
        self
    }

    /// Queue a vendor error for the next fetch.
    pub fn with_error(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Make every fetch take this long.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared call counter, for tests that hand the source to something else.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl BaseJobSource for MockJobSource {
    fn name(&self) -> SourceName {
        self.name
    }

    async fn fetch_jobs(&self) -> std::result::Result<Vec<Job>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(Vec::new())
            } else {
                responses.remove(0)
            }
        };
        next.map_err(|message| SourceError::Vendor {
            vendor: self.name,
            message,
        })
    }
}

// =============================================================================
// Mock Company Enricher
// =============================================================================

pub struct MockCompanyEnricher {
    logos: HashMap<String, String>,
    fail: bool,
    cancel_after: Option<(usize, CancellationToken)>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCompanyEnricher {
    pub fn new() -> Self {
        Self {
            logos: HashMap::new(),
            fail: false,
            cancel_after: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return `logo` for `company` (matched case-insensitively).
    pub fn with_logo(mut self, company: &str, logo: &str) -> Self {
        self.logos.insert(company.to_lowercase(), logo.to_string());
        self
    }

    /// Fail every lookup.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Cancel `token` once `calls` lookups have been made.
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockCompanyEnricher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCompanyEnricher for MockCompanyEnricher {
    async fn find_logo(&self, company: &str, _company_url: &str) -> Result<Option<String>> {
        let made = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(company.to_string());
            calls.len()
        };
        if let Some((after, token)) = &self.cancel_after {
            if made >= *after {
                token.cancel();
            }
        }
        if self.fail {
            anyhow::bail!("brand lookup unavailable");
        }
        Ok(self.logos.get(&company.to_lowercase()).cloned())
    }
}

// =============================================================================
// In-memory Schedule Store
// =============================================================================

/// Mirrors the upsert semantics of the Postgres store.
#[derive(Clone, Default)]
pub struct InMemoryScheduleStore {
    rows: Arc<Mutex<HashMap<SourceName, JobScheduleInfo>>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted next-due time, as if left by a previous process.
    pub fn with_next_run(self, source: SourceName, next_run: Option<DateTime<Utc>>) -> Self {
        let mut row = blank_row(source);
        row.next_run_time = next_run;
        self.rows.lock().unwrap().insert(source, row);
        self
    }

    pub fn get(&self, source: SourceName) -> Option<JobScheduleInfo> {
        self.rows.lock().unwrap().get(&source).cloned()
    }

    fn upsert(&self, source: SourceName, update: impl FnOnce(&mut JobScheduleInfo)) {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(source).or_insert_with(|| blank_row(source));
        update(row);
        row.updated_at = Utc::now();
    }
}

fn blank_row(source: SourceName) -> JobScheduleInfo {
    JobScheduleInfo {
        source_name: source.as_str().to_string(),
        last_run_time: None,
        next_run_time: None,
        interval_hours: source.interval_hours(),
        status: RunStatus::Scheduled,
        last_run_count: 0,
        last_error_msg: None,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl BaseScheduleStore for InMemoryScheduleStore {
    async fn load_all(&self) -> Result<Vec<JobScheduleInfo>> {
        let mut rows: Vec<_> = self.rows.lock().unwrap().values().cloned().collect();
        rows.sort_by(|a, b| a.source_name.cmp(&b.source_name));
        Ok(rows)
    }

    async fn ensure_scheduled(&self, source: SourceName, next_run: DateTime<Utc>) -> Result<()> {
        self.upsert(source, |row| {
            row.next_run_time = Some(next_run);
            row.interval_hours = source.interval_hours();
        });
        Ok(())
    }

    async fn mark_running(&self, source: SourceName, at: DateTime<Utc>) -> Result<()> {
        self.upsert(source, |row| {
            row.last_run_time = Some(at);
            row.status = RunStatus::Running;
        });
        Ok(())
    }

    async fn record_run(&self, record: &RunRecord) -> Result<()> {
        self.upsert(record.source, |row| {
            row.last_run_time = Some(record.ran_at);
            if record.next_run.is_some() {
                row.next_run_time = record.next_run;
            }
            row.status = record.status;
            row.last_run_count = record.count;
            row.last_error_msg = record.error.clone();
        });
        Ok(())
    }

    async fn set_next_run(&self, source: SourceName, next_run: DateTime<Utc>) -> Result<()> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&source) {
            row.next_run_time = Some(next_run);
            row.updated_at = Utc::now();
        }
        Ok(())
    }
}
