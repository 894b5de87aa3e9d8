//! Detection report returned by the model service.
//!
//! Field names and nesting match the model service's output schema exactly;
//! the report passes through this server untouched apart from decoding.

use serde::{Deserialize, Serialize};

/// One account flagged by the analysis, with the patterns that flagged it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    pub account_id: String,
    pub suspicion_score: f64,
    pub flags: Vec<String>,
    pub total_transactions: u64,
    pub total_sent: f64,
    pub total_received: f64,
    #[serde(default)]
    pub connected_rings: Vec<i64>,
}

/// A detected transaction cycle (fraud ring).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRing {
    pub ring_id: i64,
    pub members: Vec<String>,
    pub total_flow: f64,
    pub transaction_count: u64,
    pub risk_score: f64,
    pub cycle_length: u32,
}

/// Aggregate statistics over the analyzed transaction set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_accounts: u64,
    pub total_transactions: u64,
    pub suspicious_accounts_count: u64,
    pub fraud_rings_detected: u64,
    pub total_flagged_volume: f64,
    pub analysis_timestamp: String,
}

/// Complete detection result for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: AnalysisSummary,
    /// Processing metadata attached by the enhanced endpoint (timings,
    /// configuration used, data-quality report). Absent on the basic path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_report_json() -> serde_json::Value {
        serde_json::json!({
            "suspicious_accounts": [{
                "account_id": "ACC_0042",
                "suspicion_score": 87.5,
                "flags": ["cycle_member", "high_velocity"],
                "total_transactions": 120,
                "total_sent": 50000.0,
                "total_received": 49200.0,
                "connected_rings": [0]
            }],
            "fraud_rings": [{
                "ring_id": 0,
                "members": ["ACC_0042", "ACC_0077", "ACC_0101"],
                "total_flow": 149200.0,
                "transaction_count": 9,
                "risk_score": 92.0,
                "cycle_length": 3
            }],
            "summary": {
                "total_accounts": 500,
                "total_transactions": 10000,
                "suspicious_accounts_count": 1,
                "fraud_rings_detected": 1,
                "total_flagged_volume": 99200.0,
                "analysis_timestamp": "2026-08-06T12:00:00Z"
            }
        })
    }

    #[test]
    fn decodes_model_service_output() {
        let report: DetectionReport = serde_json::from_value(sample_report_json()).unwrap();
        assert_eq!(report.suspicious_accounts.len(), 1);
        assert_eq!(report.suspicious_accounts[0].account_id, "ACC_0042");
        assert_eq!(report.fraud_rings[0].cycle_length, 3);
        assert_eq!(report.summary.total_accounts, 500);
        assert!(report.metadata.is_none());
    }

    #[test]
    fn metadata_roundtrips_when_present() {
        let mut json = sample_report_json();
        json["metadata"] = serde_json::json!({"config_preset": "aggressive"});
        let report: DetectionReport = serde_json::from_value(json).unwrap();
        assert_eq!(
            report.metadata.as_ref().unwrap()["config_preset"],
            "aggressive"
        );
        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["metadata"]["config_preset"], "aggressive");
    }

    #[test]
    fn metadata_omitted_from_serialization_when_absent() {
        let report: DetectionReport = serde_json::from_value(sample_report_json()).unwrap();
        let out = serde_json::to_value(&report).unwrap();
        assert!(out.get("metadata").is_none());
    }
}
