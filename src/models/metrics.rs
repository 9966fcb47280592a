// Memory aggregate and the per-tick payload

use serde::{Deserialize, Serialize};

use super::DiskRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    /// Used fraction of total, 0-100, rounded to two decimals.
    pub percent: f64,
}

/// One frame on the wire. `primary_disk` is null when no disks are enumerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub cpu: u32,
    pub memory: MemoryStats,
    pub disks: Vec<DiskRecord>,
    pub primary_disk: Option<DiskRecord>,
}

impl MetricsPayload {
    /// Message tag for the overlay consumer; additive fields are allowed after it.
    pub const KIND: &'static str = "metrics";
}
