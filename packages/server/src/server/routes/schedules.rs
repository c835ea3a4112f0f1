use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::domains::schedules::JobScheduleInfo;
use crate::server::app::AppState;
use crate::server::routes::jobs::internal_error;

#[derive(Serialize)]
pub struct SchedulesResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<JobScheduleInfo>,
}

/// `GET /api/schedules`: run-state of every scheduled source.
pub async fn list_schedules_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<SchedulesResponse>, (StatusCode, Json<Value>)> {
    let rows = state.deps.schedule_store.load_all().await.map_err(|e| {
        error!(error = %e, "Failed to load run-state");
        internal_error()
    })?;

    Ok(Json(SchedulesResponse {
        success: true,
        count: rows.len(),
        data: rows,
    }))
}
