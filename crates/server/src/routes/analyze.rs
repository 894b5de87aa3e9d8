//! Job creation: accept a transaction file and launch the analysis.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use ringsight_types::{AnalysisInput, AnalysisOptions, JobId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Tuning parameters forwarded opaquely to the model service.
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub preset: Option<String>,
    pub min_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub job_id: JobId,
}

/// POST /api/analyze — accept a CSV upload, mint a job and spawn its
/// driver. Responds `202 Accepted` with the job id without waiting for any
/// part of the analysis.
async fn start_analysis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<AnalyzeResponse>)> {
    let (file_name, content) = read_upload(&mut multipart).await?;
    validate_upload(&file_name, &content)?;

    let id = Uuid::new_v4().to_string();
    state
        .jobs
        .create(&id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(
        job_id = %id,
        file_name = %file_name,
        size_bytes = content.len(),
        "Accepted analysis job"
    );

    let input = AnalysisInput::new(file_name, content).with_options(AnalysisOptions {
        preset: params.preset,
        min_score: params.min_score,
    });
    let driver = state.driver.clone();
    let job_id = id.clone();
    tokio::spawn(async move {
        driver.run(job_id, input).await;
    });

    Ok((StatusCode::ACCEPTED, Json(AnalyzeResponse { job_id: id })))
}

/// Pull the `file` field out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> ApiResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(e.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload.csv").to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidUpload(e.to_string()))?;
            return Ok((file_name, content));
        }
    }
    Err(ApiError::InvalidUpload(
        "missing multipart field `file`".into(),
    ))
}

fn validate_upload(file_name: &str, content: &Bytes) -> ApiResult<()> {
    if content.is_empty() {
        return Err(ApiError::InvalidUpload("uploaded file is empty".into()));
    }
    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(ApiError::InvalidUpload(format!(
            "expected a .csv file, got `{file_name}`"
        )));
    }
    Ok(())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(start_analysis))
}
