// Per-tick collection and aggregation into the wire payload

use std::sync::Arc;
use thiserror::Error;

use crate::disks::DiskNormalizer;
use crate::models::{DiskRecord, MemoryStats, MetricsPayload};
use crate::sysinfo_repo::{MemoryReading, SysinfoRepo};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cpu load collection failed: {0}")]
    Cpu(#[source] anyhow::Error),
    #[error("memory collection failed: {0}")]
    Memory(#[source] anyhow::Error),
    #[error("disk collection failed: {0}")]
    Disks(#[source] anyhow::Error),
}

pub struct Sampler {
    repo: Arc<SysinfoRepo>,
    normalizer: Arc<DiskNormalizer>,
}

impl Sampler {
    pub fn new(repo: Arc<SysinfoRepo>, normalizer: Arc<DiskNormalizer>) -> Self {
        Self { repo, normalizer }
    }

    /// One discarded CPU read to establish the load baseline; without it
    /// the first real tick reports 0 on every core.
    pub async fn warm_up(&self) -> anyhow::Result<()> {
        self.repo.get_cpu_load().await.map(|_| ())
    }

    /// Collects one payload. Any failed source fails the whole sample;
    /// callers skip the tick and keep their timer running.
    pub async fn sample(&self) -> Result<MetricsPayload, SampleError> {
        let (load, mem) = tokio::join!(self.repo.get_cpu_load(), self.repo.get_memory_reading());
        let load = load.map_err(SampleError::Cpu)?;
        let mem = mem.map_err(SampleError::Memory)?;
        let disks = self
            .normalizer
            .disks()
            .await
            .map_err(SampleError::Disks)?;
        Ok(build_payload(&load.per_core, mem, disks))
    }
}

/// Unweighted mean of per-core loads, rounded half-up to a whole percent.
/// An empty core list reads as 0.
pub fn average_cpu(per_core: &[f64]) -> u32 {
    if per_core.is_empty() {
        return 0;
    }
    let mean = per_core.iter().sum::<f64>() / per_core.len() as f64;
    mean.round().clamp(0.0, 100.0) as u32
}

/// `used = total - free`; percent of total used, two-decimal rounding,
/// 0 when total is 0.
pub fn memory_stats(reading: MemoryReading) -> MemoryStats {
    let total = reading.total;
    let free = reading.available;
    let used = total.saturating_sub(free);
    let percent = if total > 0 {
        ((used as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };
    MemoryStats {
        total,
        used,
        free,
        percent,
    }
}

/// The disk with the largest capacity; the first encountered wins ties.
/// None when nothing is enumerated.
pub fn primary_disk(disks: &[DiskRecord]) -> Option<DiskRecord> {
    disks
        .iter()
        .fold(None::<&DiskRecord>, |best, d| match best {
            Some(b) if b.size >= d.size => Some(b),
            _ => Some(d),
        })
        .cloned()
}

pub fn build_payload(per_core: &[f64], mem: MemoryReading, disks: Vec<DiskRecord>) -> MetricsPayload {
    let primary = primary_disk(&disks);
    MetricsPayload {
        kind: MetricsPayload::KIND.into(),
        cpu: average_cpu(per_core),
        memory: memory_stats(mem),
        disks,
        primary_disk: primary,
    }
}
