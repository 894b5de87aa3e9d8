//! Job lifecycle vocabulary: status, stages, progress events, failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an analysis job (a v4 UUID minted at creation).
pub type JobId = String;

/// Lifecycle status of an analysis job.
///
/// The only legal transitions are `Pending -> Processing` (on the first
/// stage event) and `Processing -> Completed | Failed`. `Completed` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether no further transitions are permitted out of this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// A named checkpoint in the fixed analysis pipeline.
///
/// The four detection stages between `GraphBuilt` and `ScoringDone` are
/// synthetic markers emitted around the single model-service call; true
/// granular progress is not observable from the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStage {
    Parsing,
    GraphBuilt,
    CyclesDone,
    SmurfingDone,
    ShellsDone,
    ScoringDone,
    Done,
    Error,
}

impl AnalysisStage {
    /// Nominal progress checkpoint for this stage. `Error` has no nominal
    /// value — a failed job keeps whatever progress it had reached.
    pub fn checkpoint(self) -> Option<u8> {
        match self {
            AnalysisStage::Parsing => Some(10),
            AnalysisStage::GraphBuilt => Some(25),
            AnalysisStage::CyclesDone => Some(50),
            AnalysisStage::SmurfingDone => Some(65),
            AnalysisStage::ShellsDone => Some(80),
            AnalysisStage::ScoringDone => Some(95),
            AnalysisStage::Done => Some(100),
            AnalysisStage::Error => None,
        }
    }

    /// Whether this stage ends the event stream.
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisStage::Done | AnalysisStage::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisStage::Parsing => "PARSING",
            AnalysisStage::GraphBuilt => "GRAPH_BUILT",
            AnalysisStage::CyclesDone => "CYCLES_DONE",
            AnalysisStage::SmurfingDone => "SMURFING_DONE",
            AnalysisStage::ShellsDone => "SHELLS_DONE",
            AnalysisStage::ScoringDone => "SCORING_DONE",
            AnalysisStage::Done => "DONE",
            AnalysisStage::Error => "ERROR",
        }
    }
}

/// Coarse event category, used as the SSE event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Progress,
    Done,
    Error,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Progress => "progress",
            EventKind::Done => "done",
            EventKind::Error => "error",
        }
    }
}

/// One immutable entry in a job's ordered event history.
///
/// Serialized flat as `{type, stage, message, progress, timestamp}` — the
/// shape pushed to SSE subscribers and replayed on attach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub stage: AnalysisStage,
    pub message: String,
    pub progress: u8,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    /// Event for a named pipeline checkpoint (including terminal `Done`).
    pub fn checkpoint(stage: AnalysisStage, message: impl Into<String>) -> Self {
        let kind = if stage == AnalysisStage::Done {
            EventKind::Done
        } else {
            EventKind::Progress
        };
        Self {
            kind,
            stage,
            message: message.into(),
            progress: stage.checkpoint().unwrap_or(0),
            timestamp: Utc::now(),
        }
    }

    /// Terminal error event. `progress` is the job's last-known value — a
    /// failure does not rewind what observers have already been told.
    pub fn failure(message: impl Into<String>, progress: u8) -> Self {
        Self {
            kind: EventKind::Error,
            stage: AnalysisStage::Error,
            message: message.into(),
            progress,
            timestamp: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}

/// Why a job failed, coarse enough to act on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The model service did not answer within the configured deadline.
    Timeout,
    /// Connection-level failure talking to the model service.
    Transport,
    /// The model service answered with a non-success status.
    Rejected,
    /// The model service answered 200 with a body we could not decode.
    Malformed,
    /// Anything that went wrong on our side of the boundary.
    Internal,
}

/// Terminal error recorded on a failed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
