//! Error taxonomy for the model service boundary.

use ringsight_types::FailureKind;
use thiserror::Error;

/// Everything that can go wrong calling the detection model service.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("model service did not respond within the configured timeout")]
    Timeout,

    #[error("transport error talking to the model service: {0}")]
    Transport(String),

    #[error("model service rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("model service returned an undecodable body: {0}")]
    Malformed(String),
}

impl DetectorError {
    /// Classification recorded on the failed job.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DetectorError::Timeout => FailureKind::Timeout,
            DetectorError::Transport(_) => FailureKind::Transport,
            DetectorError::Rejected { .. } => FailureKind::Rejected,
            DetectorError::Malformed(_) => FailureKind::Malformed,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DetectorError::Timeout
        } else {
            DetectorError::Transport(err.to_string())
        }
    }
}
