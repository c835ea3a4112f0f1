use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::domains::jobs::JobListing;
use crate::server::app::AppState;

/// Generic 500 reply; the detail only goes to the log.
pub(crate) fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": "Internal server error" })),
    )
}

#[derive(Serialize)]
pub struct JobsResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<JobListing>,
}

/// `GET /api/jobs`: every stored job, newest posting first.
pub async fn list_jobs_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<JobsResponse>, (StatusCode, Json<Value>)> {
    let jobs = JobListing::find_all(&state.db_pool).await.map_err(|e| {
        error!(error = %e, "Failed to load jobs");
        internal_error()
    })?;

    Ok(Json(JobsResponse {
        success: true,
        count: jobs.len(),
        data: jobs,
    }))
}
