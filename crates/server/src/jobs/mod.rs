//! Job orchestration: the record store, the analysis driver and the
//! retention sweep.

pub mod driver;
pub mod store;
pub mod sweep;

pub use driver::AnalysisDriver;
pub use store::{JobRecord, JobStore, JobStoreError, JobSummary};
pub use sweep::spawn_retention_sweep;
