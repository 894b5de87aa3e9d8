//! HTTP client for the model service's detect endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use ringsight_types::{AnalysisInput, DetectionReport};

use crate::error::DetectorError;

/// The detection collaborator as seen by the analysis driver: one call per
/// job, a structured report or a classified error back.
#[async_trait]
pub trait DetectionService: Send + Sync {
    async fn detect(&self, input: &AnalysisInput) -> Result<DetectionReport, DetectorError>;
}

/// `DetectionService` over HTTP multipart upload.
///
/// Plain uploads go to `POST {base}/detect`; when tuning options are present
/// the request goes to `POST {base}/detect/enhanced` with the options as
/// query parameters. The request timeout is set on the underlying client,
/// so a hung model service surfaces as `DetectorError::Timeout`.
pub struct HttpDetectionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDetectionService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn form_for(input: &AnalysisInput) -> Result<Form, DetectorError> {
        let part = Part::bytes(input.content.to_vec())
            .file_name(input.file_name.clone())
            .mime_str("text/csv")
            .map_err(|e| DetectorError::Transport(e.to_string()))?;
        Ok(Form::new().part("file", part))
    }

    /// Pull a human-readable detail out of the model service's error
    /// envelope (`{"error": {"message": ...}}`), falling back to the raw
    /// body when it isn't JSON in that shape.
    fn rejection_detail(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.pointer("/detail"))
                    .and_then(|m| m.as_str().map(String::from))
            })
            .unwrap_or_else(|| {
                let mut detail = body.trim().to_string();
                detail.truncate(200);
                detail
            })
    }
}

#[async_trait]
impl DetectionService for HttpDetectionService {
    async fn detect(&self, input: &AnalysisInput) -> Result<DetectionReport, DetectorError> {
        let mut request = if input.options.is_default() {
            self.client.post(format!("{}/detect", self.base_url))
        } else {
            self.client
                .post(format!("{}/detect/enhanced", self.base_url))
        };
        if let Some(preset) = &input.options.preset {
            request = request.query(&[("preset", preset.as_str())]);
        }
        if let Some(min_score) = input.options.min_score {
            request = request.query(&[("min_score", min_score.to_string().as_str())]);
        }

        tracing::debug!(
            file_name = %input.file_name,
            size_bytes = input.content.len(),
            "Sending transaction file to model service"
        );

        let response = request
            .multipart(Self::form_for(input)?)
            .send()
            .await
            .map_err(DetectorError::from_reqwest)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(DetectorError::from_reqwest)?;

        if !status.is_success() {
            return Err(DetectorError::Rejected {
                status: status.as_u16(),
                detail: Self::rejection_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| DetectorError::Malformed(e.to_string()))
    }
}
