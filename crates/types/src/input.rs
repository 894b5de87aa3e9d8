//! Upload payload handed from the create endpoint to the analysis driver.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Optional tuning parameters, opaque to the orchestration core — they are
/// forwarded verbatim to the model service's enhanced endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub preset: Option<String>,
    pub min_score: Option<f64>,
}

impl AnalysisOptions {
    /// True when no tuning was requested and the basic detect endpoint
    /// should be used.
    pub fn is_default(&self) -> bool {
        self.preset.is_none() && self.min_score.is_none()
    }
}

/// An accepted transaction file plus its tuning options.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub file_name: String,
    pub content: Bytes,
    pub options: AnalysisOptions,
}

impl AnalysisInput {
    pub fn new(file_name: impl Into<String>, content: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}
