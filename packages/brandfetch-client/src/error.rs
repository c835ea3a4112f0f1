use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrandfetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Brandfetch API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse brand response: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BrandfetchError>;
