//! Classification policy applied to every candidate before it is stored.
//!
//! Order matters: blocklist, then topical relevance, then the duplicate check
//! (which needs the store and lives in the persistence path).

use chrono::{DateTime, Datelike, Utc};

use super::models::Job;

/// Employers the board does not list. Matched as case-insensitive substrings,
/// so "Canonical Ltd" and "Canonically Speaking Inc" are both blocked.
pub const BLOCKED_COMPANIES: [&str; 2] = ["canonical", "crossover"];

pub fn is_blocked_company(company: &str) -> bool {
    let company = company.to_lowercase();
    BLOCKED_COMPANIES
        .iter()
        .any(|blocked| company.contains(blocked))
}

/// Whether a posting is about Go: "golang" anywhere, or "go" as a whole token
/// bounded by whitespace, punctuation or the string edges.
pub fn is_relevant(title: &str, description: &str) -> bool {
    mentions_go(title) || mentions_go(description)
}

fn mentions_go(text: &str) -> bool {
    let text = text.to_lowercase();
    if text.contains("golang") {
        return true;
    }
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == "go")
}

/// The (title, company, posting month) triple that identifies one real-world posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    title: String,
    company: String,
    month: Option<(i32, u32)>,
}

impl NaturalKey {
    pub fn of(job: &Job) -> Self {
        Self::new(&job.title, &job.company, job.posted_at)
    }

    pub fn new(title: &str, company: &str, posted_at: Option<DateTime<Utc>>) -> Self {
        Self {
            title: title.to_lowercase(),
            company: company.to_lowercase(),
            month: posted_at.map(|ts| (ts.year(), ts.month())),
        }
    }
}

/// Outcome of the in-memory policy checks for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Blocked,
    NotRelevant,
}

pub fn classify(job: &Job) -> Verdict {
    if is_blocked_company(&job.company) {
        Verdict::Blocked
    } else if !is_relevant(&job.title, &job.description) {
        Verdict::NotRelevant
    } else {
        Verdict::Accept
    }
}
