use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four job feeds the board ingests from.
///
/// The slug returned by [`SourceName::as_str`] is the single spelling used in
/// the `jobs.source` column, the `job_schedule_info` primary key, the sync
/// endpoint's `source` parameter and configuration lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "jsearch")]
    JSearch,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "indeed")]
    Indeed,
    #[serde(rename = "apify_linkedin")]
    ApifyLinkedIn,
}

#[derive(Debug, Error)]
#[error("unknown source '{0}' (expected one of: jsearch, linkedin, indeed, apify_linkedin)")]
pub struct UnknownSource(pub String);

impl SourceName {
    pub const ALL: [SourceName; 4] = [
        SourceName::JSearch,
        SourceName::LinkedIn,
        SourceName::Indeed,
        SourceName::ApifyLinkedIn,
    ];

    /// Sources driven by the scheduler unless configured otherwise.
    /// The RapidAPI LinkedIn feed stays manual-only by default.
    pub const DEFAULT_SCHEDULED: [SourceName; 3] = [
        SourceName::JSearch,
        SourceName::Indeed,
        SourceName::ApifyLinkedIn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceName::JSearch => "jsearch",
            SourceName::LinkedIn => "linkedin",
            SourceName::Indeed => "indeed",
            SourceName::ApifyLinkedIn => "apify_linkedin",
        }
    }

    /// Hours between scheduled runs. JSearch is rate limited but the most valuable feed.
    pub fn interval_hours(self) -> i32 {
        match self {
            SourceName::JSearch => 12,
            SourceName::LinkedIn | SourceName::Indeed | SourceName::ApifyLinkedIn => 24,
        }
    }

    pub fn interval(self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.interval_hours()))
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceName {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        SourceName::ALL
            .into_iter()
            .find(|source| source.as_str() == normalized)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}
