// Raw system readings via sysinfo

use std::sync::Arc;
use sysinfo::{Disks, System};
use tracing::instrument;

/// Per-core CPU loads, each 0-100.
#[derive(Debug, Clone)]
pub struct CpuLoad {
    pub per_core: Vec<f64>,
}

/// Memory counters in bytes.
#[derive(Debug, Clone, Copy)]
pub struct MemoryReading {
    pub total: u64,
    pub available: u64,
}

/// One mounted filesystem as the OS reports it, before normalization.
#[derive(Debug, Clone)]
pub struct FilesystemReading {
    pub fs: String,
    pub mount: String,
    pub type_: Option<String>,
    pub size: u64,
    pub used: u64,
    pub use_percent: f64,
}

pub struct SysinfoRepo {
    sys: Arc<std::sync::Mutex<System>>,
    disks: Arc<std::sync::Mutex<Disks>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        Self {
            sys: Arc::new(std::sync::Mutex::new(sys)),
            disks: Arc::new(std::sync::Mutex::new(disks)),
        }
    }

    /// Per-core loads since the previous refresh. The first read after
    /// construction has no baseline and reports zeros; issue one discarded
    /// read before trusting the values.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_cpu_load"))]
    pub async fn get_cpu_load(&self) -> anyhow::Result<CpuLoad> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_cpu_all();
            let per_core: Vec<f64> = sys
                .cpus()
                .iter()
                .map(|c| (c.cpu_usage() as f64).clamp(0.0, 100.0))
                .collect();
            Ok(CpuLoad { per_core })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_memory_reading"))]
    pub async fn get_memory_reading(&self) -> anyhow::Result<MemoryReading> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();
            Ok(MemoryReading {
                total: sys.total_memory(),
                available: sys.available_memory(),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_filesystems"))]
    pub async fn get_filesystems(&self) -> anyhow::Result<Vec<FilesystemReading>> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks_guard = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks_guard.refresh(false);
            let readings: Vec<FilesystemReading> = disks_guard
                .list()
                .iter()
                .map(|d| {
                    let size = d.total_space();
                    let available = d.available_space();
                    let used = size.saturating_sub(available);
                    let use_percent = if size > 0 {
                        (used as f64 / size as f64) * 100.0
                    } else {
                        0.0
                    };
                    let type_ = d.file_system().to_string_lossy().into_owned();
                    FilesystemReading {
                        fs: d.name().to_string_lossy().into_owned(),
                        mount: d.mount_point().to_string_lossy().into_owned(),
                        type_: if type_.is_empty() { None } else { Some(type_) },
                        size,
                        used,
                        use_percent,
                    }
                })
                .collect();
            Ok(readings)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}
