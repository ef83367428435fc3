use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the metrics table: commits by `user` in `repo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub repo: String,
    pub user: String,
    pub contributions: u64,
    pub commits: u64,
}

/// Envelope printed with `--json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub organization: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    pub records: Vec<MetricRecord>,
}

impl MetricsReport {
    pub fn new(organization: impl Into<String>, records: Vec<MetricRecord>) -> Self {
        Self {
            organization: organization.into(),
            generated_at: Utc::now(),
            records,
        }
    }
}

/// Rate limit state reported by the last API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}
