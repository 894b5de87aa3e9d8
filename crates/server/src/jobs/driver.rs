//! The per-job orchestration loop.
//!
//! One driver run per job, spawned fire-and-forget from the create handler
//! and running to a terminal state regardless of whether anyone is
//! watching. The model service is called exactly once; the detection-pass
//! stages around that call are synthetic markers, since the collaborator
//! exposes no granular progress of its own.

use std::sync::Arc;
use std::time::Duration;

use ringsight_detector::DetectionService;
use ringsight_types::{AnalysisInput, AnalysisStage, FailureKind, JobFailure, JobId, ProgressEvent};

use super::store::JobStore;

pub struct AnalysisDriver {
    store: Arc<JobStore>,
    detector: Arc<dyn DetectionService>,
    detection_timeout: Duration,
}

impl AnalysisDriver {
    pub fn new(
        store: Arc<JobStore>,
        detector: Arc<dyn DetectionService>,
        detection_timeout: Duration,
    ) -> Self {
        Self {
            store,
            detector,
            detection_timeout,
        }
    }

    /// Drive one job to `Completed` or `Failed`. Never returns an error:
    /// every failure is absorbed into the job record, and signals arriving
    /// after the job is terminal are dropped with a warning.
    pub async fn run(&self, id: JobId, input: AnalysisInput) {
        self.emit(&id, AnalysisStage::Parsing, "Parsing transaction file");
        self.emit(&id, AnalysisStage::GraphBuilt, "Transaction graph assembled");

        let outcome =
            tokio::time::timeout(self.detection_timeout, self.detector.detect(&input)).await;

        match outcome {
            Ok(Ok(report)) => {
                self.emit(&id, AnalysisStage::CyclesDone, "Cycle detection pass complete");
                self.emit(
                    &id,
                    AnalysisStage::SmurfingDone,
                    "Smurfing detection pass complete",
                );
                self.emit(
                    &id,
                    AnalysisStage::ShellsDone,
                    "Shell account detection pass complete",
                );
                self.emit(&id, AnalysisStage::ScoringDone, "Suspicion scoring complete");

                match self.store.complete(&id, report) {
                    Ok(()) => tracing::info!(job_id = %id, "Analysis completed"),
                    Err(e) => {
                        tracing::warn!(job_id = %id, error = %e, "Discarding completion signal")
                    }
                }
            }
            Ok(Err(err)) => {
                self.abort(&id, JobFailure::new(err.failure_kind(), err.to_string()));
            }
            Err(_) => {
                self.abort(
                    &id,
                    JobFailure::new(
                        FailureKind::Timeout,
                        format!(
                            "analysis did not finish within {}s",
                            self.detection_timeout.as_secs()
                        ),
                    ),
                );
            }
        }
    }

    fn emit(&self, id: &str, stage: AnalysisStage, message: &str) {
        if let Err(e) = self
            .store
            .append_event(id, ProgressEvent::checkpoint(stage, message))
        {
            tracing::warn!(job_id = %id, stage = stage.as_str(), error = %e, "Dropping stage event");
        }
    }

    fn abort(&self, id: &str, failure: JobFailure) {
        tracing::warn!(
            job_id = %id,
            kind = ?failure.kind,
            message = %failure.message,
            "Analysis failed"
        );
        if let Err(e) = self.store.fail(id, failure) {
            tracing::warn!(job_id = %id, error = %e, "Discarding failure signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use ringsight_detector::DetectorError;
    use ringsight_types::{AnalysisSummary, DetectionReport, JobStatus};

    /// Detector double scripted with a plain closure.
    struct FnDetector<F>(F);

    #[async_trait]
    impl<F> DetectionService for FnDetector<F>
    where
        F: Fn() -> Result<DetectionReport, DetectorError> + Send + Sync,
    {
        async fn detect(&self, _input: &AnalysisInput) -> Result<DetectionReport, DetectorError> {
            (self.0)()
        }
    }

    /// Detector that never answers, for exercising the driver deadline.
    struct HangingDetector;

    #[async_trait]
    impl DetectionService for HangingDetector {
        async fn detect(&self, _input: &AnalysisInput) -> Result<DetectionReport, DetectorError> {
            tokio::time::sleep(Duration::from_secs(86_400)).await;
            Err(DetectorError::Timeout)
        }
    }

    fn empty_report() -> DetectionReport {
        DetectionReport {
            suspicious_accounts: Vec::new(),
            fraud_rings: Vec::new(),
            summary: AnalysisSummary {
                total_accounts: 42,
                total_transactions: 1000,
                suspicious_accounts_count: 0,
                fraud_rings_detected: 0,
                total_flagged_volume: 0.0,
                analysis_timestamp: "2026-08-06T00:00:00Z".into(),
            },
            metadata: None,
        }
    }

    fn sample_input() -> AnalysisInput {
        AnalysisInput::new(
            "transactions.csv",
            bytes::Bytes::from_static(b"transaction_id,sender_id,receiver_id,amount,timestamp\n"),
        )
    }

    fn driver_with(
        detector: Arc<dyn DetectionService>,
        timeout: Duration,
    ) -> (Arc<JobStore>, AnalysisDriver) {
        let store = Arc::new(JobStore::new());
        let driver = AnalysisDriver::new(store.clone(), detector, timeout);
        (store, driver)
    }

    #[tokio::test]
    async fn success_emits_all_seven_stages() {
        let (store, driver) = driver_with(
            Arc::new(FnDetector(|| Ok(empty_report()))),
            Duration::from_secs(5),
        );
        store.create("job-1").unwrap();
        driver.run("job-1".into(), sample_input()).await;

        let record = store.snapshot("job-1").unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.progress, 100);
        assert!(record.result.is_some());
        assert!(record.error.is_none());

        let stages: Vec<AnalysisStage> = record.events.iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![
                AnalysisStage::Parsing,
                AnalysisStage::GraphBuilt,
                AnalysisStage::CyclesDone,
                AnalysisStage::SmurfingDone,
                AnalysisStage::ShellsDone,
                AnalysisStage::ScoringDone,
                AnalysisStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn collaborator_rejection_fails_job_and_keeps_progress() {
        let (store, driver) = driver_with(
            Arc::new(FnDetector(|| {
                Err(DetectorError::Rejected {
                    status: 400,
                    detail: "missing column: amount".into(),
                })
            })),
            Duration::from_secs(5),
        );
        store.create("job-1").unwrap();
        driver.run("job-1".into(), sample_input()).await;

        let record = store.snapshot("job-1").unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert!(record.result.is_none());
        let failure = record.error.unwrap();
        assert_eq!(failure.kind, FailureKind::Rejected);
        assert!(failure.message.contains("missing column"));

        // PARSING, GRAPH_BUILT, then the terminal ERROR at the progress the
        // job had reached.
        assert_eq!(record.progress, 25);
        let stages: Vec<AnalysisStage> = record.events.iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![
                AnalysisStage::Parsing,
                AnalysisStage::GraphBuilt,
                AnalysisStage::Error,
            ]
        );
        assert_eq!(record.events.last().unwrap().progress, 25);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_collaborator_times_out_into_failed() {
        let (store, driver) = driver_with(Arc::new(HangingDetector), Duration::from_secs(120));
        store.create("job-1").unwrap();
        driver.run("job-1".into(), sample_input()).await;

        let record = store.snapshot("job-1").unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        let failure = record.error.unwrap();
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert!(record.events.last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn late_run_against_terminal_job_is_a_noop() {
        let (store, driver) = driver_with(
            Arc::new(FnDetector(|| Ok(empty_report()))),
            Duration::from_secs(5),
        );
        store.create("job-1").unwrap();
        store
            .fail(
                "job-1",
                JobFailure::new(FailureKind::Internal, "already dead"),
            )
            .unwrap();

        driver.run("job-1".into(), sample_input()).await;

        let record = store.snapshot("job-1").unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert!(record.result.is_none());
        // Only the original terminal event is in the history.
        assert_eq!(record.events.len(), 1);
    }
}
