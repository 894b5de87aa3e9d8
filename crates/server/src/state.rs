//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use ringsight_detector::DetectionService;

use crate::config::ServerConfig;
use crate::jobs::{AnalysisDriver, JobStore};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Effective configuration, resolved once at startup.
    pub config: ServerConfig,
    /// Canonical job records plus their event broadcast.
    pub jobs: Arc<JobStore>,
    /// Orchestration loop spawned once per accepted job.
    pub driver: Arc<AnalysisDriver>,
}

impl AppState {
    /// Create the application state wrapped in an `Arc` for sharing.
    pub fn new(config: ServerConfig, detector: Arc<dyn DetectionService>) -> Arc<Self> {
        let jobs = Arc::new(JobStore::new());
        let driver = Arc::new(AnalysisDriver::new(
            jobs.clone(),
            detector,
            config.detection_timeout,
        ));
        Arc::new(Self {
            start_time: Instant::now(),
            config,
            jobs,
            driver,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
