use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domains::source::SourceName;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncParams {
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub timestamp: String,
}

/// `POST /api/jobs/sync?source=<name>`: start a fetch-and-save cycle in the background.
///
/// Without `source` every configured source is synced, each independently.
/// The schedule is left alone; manual runs do not move the next due time.
pub async fn sync_jobs_handler(
    Extension(state): Extension<AppState>,
    Query(params): Query<SyncParams>,
) -> Response {
    let requested = params.source.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let sources: Vec<SourceName> = match requested {
        Some(raw) => match raw.parse::<SourceName>() {
            Ok(name) => vec![name],
            Err(_) => {
                return (StatusCode::BAD_REQUEST, format!("Invalid source: {}", raw))
                    .into_response();
            }
        },
        None => {
            let mut all: Vec<SourceName> = state.deps.sources.keys().copied().collect();
            all.sort();
            all
        }
    };

    info!(sources = ?sources, "Manual sync requested");

    for name in sources {
        let deps = state.deps.clone();
        tokio::spawn(async move {
            match deps.run_source(name, None).await {
                Ok(outcome) => info!(
                    source = %name,
                    status = %outcome.status,
                    count = outcome.count,
                    "Manual sync finished"
                ),
                Err(e) => error!(source = %name, error = %e, "Manual sync could not start"),
            }
        });
    }

    Json(SyncResponse {
        success: true,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
    .into_response()
}
