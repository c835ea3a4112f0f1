use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Apify API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Actor reported an error: {0}")]
    Actor(String),

    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApifyError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApifyError::Network(e) => e.is_timeout() || e.is_connect(),
            ApifyError::Api { status, .. } => *status == 429 || *status >= 500,
            ApifyError::Actor(_) | ApifyError::Parse(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApifyError>;
