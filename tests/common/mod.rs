// Shared test helpers

use glancer::models::DiskRecord;

pub fn disk(name: &str, mount: &str, size: u64) -> DiskRecord {
    DiskRecord {
        name: name.into(),
        mount: mount.into(),
        type_: "volume".into(),
        size,
        used: size / 2,
        available: size - size / 2,
        use_percent: 50.0,
    }
}
