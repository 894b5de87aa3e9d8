//! Terminal result fetch.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use ringsight_types::{DetectionReport, JobFailure, JobStatus};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::jobs::JobRecord;
use crate::state::AppState;

/// Status-tagged result payload: exactly one of `result` / `error` is
/// present once the job is terminal, `progress` while it is not.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DetectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

impl From<JobRecord> for ResultResponse {
    fn from(record: JobRecord) -> Self {
        match record.status {
            JobStatus::Completed => Self {
                status: record.status,
                progress: None,
                result: record.result,
                error: None,
            },
            JobStatus::Failed => Self {
                status: record.status,
                progress: None,
                result: None,
                error: record.error,
            },
            JobStatus::Pending | JobStatus::Processing => Self {
                status: record.status,
                progress: Some(record.progress),
                result: None,
                error: None,
            },
        }
    }
}

/// GET /api/analyze/{id}/result — the terminal result, the terminal error,
/// or an in-progress indicator with the current percentage.
async fn fetch_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResultResponse>> {
    let record = state
        .jobs
        .snapshot(&id)
        .ok_or(ApiError::JobNotFound(id))?;
    Ok(Json(record.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analyze/{id}/result", get(fetch_result))
}
