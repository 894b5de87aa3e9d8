//! Client for the detection model service.
//!
//! The model service is the external collaborator that owns the actual
//! detection algorithms (cycle, smurfing and shell-account passes plus
//! scoring). This crate owns the boundary: one `detect` call per job,
//! bounded by a timeout, with every failure mode folded into a small
//! taxonomy the job store can record.

pub mod client;
pub mod error;

pub use client::{DetectionService, HttpDetectionService};
pub use error::DetectorError;
