// Disk models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskRecord {
    pub name: String,
    pub mount: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub use_percent: f64,
}
