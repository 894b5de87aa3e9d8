//! API route handlers for the ringsight server.

pub mod analyze;
pub mod health;
pub mod jobs;
pub mod progress;
pub mod results;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET  /api/health               - Health check
/// - POST /api/analyze              - Accept a CSV upload, start a job
/// - GET  /api/analyze/:id/events   - SSE stream of job progress
/// - GET  /api/analyze/:id/result   - Terminal result / error / progress
/// - GET  /api/jobs                 - List all in-flight jobs
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", analyze::router())
        .nest("/api", progress::router())
        .nest("/api", results::router())
        .nest("/api", jobs::router())
        .with_state(state)
}
