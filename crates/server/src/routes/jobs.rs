//! Listing of in-flight jobs.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::jobs::JobSummary;
use crate::state::AppState;

/// GET /api/jobs — all jobs that have not reached a terminal state.
async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobSummary>> {
    Json(state.jobs.active_jobs())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/jobs", get(list_jobs))
}
