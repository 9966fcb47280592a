// Disk Normalizer: platform-selected enumeration with a process-wide report cache

pub mod report;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::models::DiskRecord;
use crate::sysinfo_repo::{FilesystemReading, SysinfoRepo};

/// TTL cache for the raw-report path, shared by every connection so
/// concurrent ticks within the window observe one fetch. The lock is held
/// across the fetch itself: a tick arriving mid-fetch waits and then reads
/// the fresh set instead of invoking a second report.
pub struct DiskCache {
    ttl: Duration,
    state: Mutex<Option<(Instant, Vec<DiskRecord>)>>,
}

impl DiskCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Returns the cached set when it is younger than the TTL and non-empty;
    /// otherwise runs `fetch` and stores the result (empty sets included)
    /// with a fresh timestamp. A failed fetch leaves the cache untouched.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> anyhow::Result<Vec<DiskRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<DiskRecord>>>,
    {
        let mut guard = self.state.lock().await;
        if let Some((fetched_at, records)) = guard.as_ref()
            && fetched_at.elapsed() < self.ttl
            && !records.is_empty()
        {
            return Ok(records.clone());
        }
        let records = fetch().await?;
        *guard = Some((Instant::now(), records.clone()));
        Ok(records)
    }
}

enum DiskSource {
    Generic(Arc<SysinfoRepo>),
    RawReport,
}

pub struct DiskNormalizer {
    source: DiskSource,
    cache: DiskCache,
}

impl DiskNormalizer {
    /// Picks the enumeration strategy once at startup. macOS filesystem
    /// enumeration via sysinfo reports APFS snapshot and system volumes as
    /// separate disks, so that platform goes through `df -kP` with the
    /// exclusion rules instead.
    pub fn select(repo: Arc<SysinfoRepo>, cache_ttl: Duration) -> Self {
        let source = if cfg!(target_os = "macos") {
            DiskSource::RawReport
        } else {
            DiskSource::Generic(repo)
        };
        Self {
            source,
            cache: DiskCache::new(cache_ttl),
        }
    }

    pub async fn disks(&self) -> anyhow::Result<Vec<DiskRecord>> {
        match &self.source {
            DiskSource::Generic(repo) => {
                let readings = repo.get_filesystems().await?;
                Ok(normalize_filesystems(readings))
            }
            DiskSource::RawReport => self.cache.get_or_fetch(fetch_report_disks).await,
        }
    }
}

/// Maps adapter filesystem readings straight into disk records; `type`
/// falls back to "volume" when the OS reports none.
pub fn normalize_filesystems(readings: Vec<FilesystemReading>) -> Vec<DiskRecord> {
    readings
        .into_iter()
        .map(|r| DiskRecord {
            name: r.fs,
            mount: r.mount,
            type_: r.type_.unwrap_or_else(|| "volume".into()),
            size: r.size,
            used: r.used,
            available: r.size.saturating_sub(r.used),
            use_percent: r.use_percent.clamp(0.0, 100.0),
        })
        .collect()
}

async fn fetch_report_disks() -> anyhow::Result<Vec<DiskRecord>> {
    let output = tokio::process::Command::new("df")
        .arg("-kP")
        .output()
        .await?;
    anyhow::ensure!(output.status.success(), "df exited with {}", output.status);
    let raw = String::from_utf8_lossy(&output.stdout);
    let records = report::parse_report(&raw, report::DEFAULT_EXCLUDES);
    tracing::debug!(disks = records.len(), "disk report fetched");
    Ok(records)
}
