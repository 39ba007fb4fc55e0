use super::null_as_default;
use serde::Deserialize;

/// Newest `performance_metrics_by_appliance` sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerformanceSample {
    pub appliance_id:    String,
    #[serde(default)]
    pub timestamp:       Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_iops:      f64,
    /// Bytes per second.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_bandwidth: f64,
}

/// Newest `space_metrics_by_appliance` sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpaceSample {
    pub appliance_id:   String,
    #[serde(default)]
    pub timestamp:      Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub physical_total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub physical_used:  u64,
    #[serde(default)]
    pub data_reduction: Option<f64>,
}
