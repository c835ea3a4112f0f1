use apify_client::ApifyError;
use thiserror::Error;

use super::SourceName;

/// Why a source failed to produce a batch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{vendor}: request failed: {error}")]
    Transport {
        vendor: SourceName,
        #[source]
        error: reqwest::Error,
    },

    #[error("{vendor}: vendor returned HTTP {status}: {body}")]
    Status {
        vendor: SourceName,
        status: u16,
        body: String,
    },

    #[error("{vendor}: could not parse response: {message}")]
    Parse { vendor: SourceName, message: String },

    #[error("{vendor}: vendor reported an error: {message}")]
    Vendor { vendor: SourceName, message: String },

    #[error("{vendor}: no data returned")]
    NoData { vendor: SourceName },

    #[error("{vendor}: {error}")]
    Apify {
        vendor: SourceName,
        #[source]
        error: ApifyError,
    },
}

impl SourceError {
    /// Transport hiccups, rate limiting and vendor 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Transport { error, .. } => error.is_timeout() || error.is_connect(),
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            SourceError::Apify { error, .. } => error.is_transient(),
            SourceError::Parse { .. } | SourceError::Vendor { .. } | SourceError::NoData { .. } => {
                false
            }
        }
    }

    pub fn vendor(&self) -> SourceName {
        match self {
            SourceError::Transport { vendor, .. }
            | SourceError::Status { vendor, .. }
            | SourceError::Parse { vendor, .. }
            | SourceError::Vendor { vendor, .. }
            | SourceError::NoData { vendor }
            | SourceError::Apify { vendor, .. } => *vendor,
        }
    }

    pub fn parse(vendor: SourceName, err: impl std::fmt::Display) -> Self {
        SourceError::Parse {
            vendor,
            message: err.to_string(),
        }
    }
}
