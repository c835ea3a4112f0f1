//! Optional on-disk copy of raw vendor responses, for debugging parser drift.

use std::path::PathBuf;

use crate::domains::source::SourceName;

#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    dir: Option<PathBuf>,
}

impl ResponseCache {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn path_for(&self, source: SourceName) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}_response.json", source.as_str())))
    }

    /// Best effort: failures are logged and never fail the fetch.
    pub async fn store(&self, source: SourceName, body: &str) {
        let (Some(dir), Some(path)) = (self.dir.as_ref(), self.path_for(source)) else {
            return;
        };
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::warn!(source = %source, error = %e, "Failed to create response cache dir");
            return;
        }
        match tokio::fs::write(&path, body).await {
            Ok(()) => {
                tracing::debug!(source = %source, path = %path.display(), "Cached raw response")
            }
            Err(e) => tracing::warn!(source = %source, error = %e, "Failed to cache raw response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_writes_per_source_file() {
        let dir = std::env::temp_dir().join(format!("jobboard-cache-{}", uuid::Uuid::new_v4()));
        let cache = ResponseCache::new(Some(dir.clone()));

        cache.store(SourceName::Indeed, "[]").await;

        let written = tokio::fs::read_to_string(dir.join("indeed_response.json"))
            .await
            .unwrap();
        assert_eq!(written, "[]");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_disabled_cache_is_noop() {
        let cache = ResponseCache::disabled();
        assert!(cache.path_for(SourceName::JSearch).is_none());
        cache.store(SourceName::JSearch, "{}").await;
    }
}
