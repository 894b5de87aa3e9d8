//! Shared domain and wire types for the ringsight analysis server.
//!
//! Everything that crosses a crate boundary lives here: the job lifecycle
//! vocabulary (`JobStatus`, `AnalysisStage`, `ProgressEvent`), the failure
//! classification recorded on failed jobs, the upload payload handed to the
//! analysis driver, and the detection report returned by the model service.

pub mod input;
pub mod job;
pub mod report;

pub use input::{AnalysisInput, AnalysisOptions};
pub use job::{
    AnalysisStage, EventKind, FailureKind, JobFailure, JobId, JobStatus, ProgressEvent,
};
pub use report::{AnalysisSummary, DetectionReport, FraudRing, SuspiciousAccount};
