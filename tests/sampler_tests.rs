// Aggregation tests: CPU mean, memory stats, primary disk, payload assembly

mod common;

use glancer::disks::normalize_filesystems;
use glancer::models::MetricsPayload;
use glancer::sampler::{average_cpu, build_payload, memory_stats, primary_disk};
use glancer::sysinfo_repo::{FilesystemReading, MemoryReading};

#[test]
fn test_average_cpu_is_rounded_mean() {
    assert_eq!(average_cpu(&[10.0, 20.0, 30.0]), 20);
    assert_eq!(average_cpu(&[0.0, 0.0]), 0);
    assert_eq!(average_cpu(&[100.0, 100.0]), 100);
}

#[test]
fn test_average_cpu_rounds_half_up() {
    assert_eq!(average_cpu(&[0.5]), 1);
    assert_eq!(average_cpu(&[33.0, 34.0]), 34); // mean 33.5
    assert_eq!(average_cpu(&[33.0, 33.8]), 33); // mean 33.4
}

#[test]
fn test_average_cpu_empty_is_zero() {
    assert_eq!(average_cpu(&[]), 0);
}

#[test]
fn test_memory_stats_used_and_percent() {
    let mem = memory_stats(MemoryReading {
        total: 16_000_000_000,
        available: 8_000_000_000,
    });
    assert_eq!(mem.total, 16_000_000_000);
    assert_eq!(mem.used, 8_000_000_000);
    assert_eq!(mem.free, 8_000_000_000);
    assert_eq!(mem.percent, 50.0);
}

#[test]
fn test_memory_stats_percent_two_decimal_rounding() {
    let mem = memory_stats(MemoryReading {
        total: 3,
        available: 1,
    });
    // 2/3 = 66.666...% -> 66.67
    assert_eq!(mem.used, 2);
    assert_eq!(mem.percent, 66.67);
}

#[test]
fn test_memory_stats_zero_total() {
    let mem = memory_stats(MemoryReading {
        total: 0,
        available: 0,
    });
    assert_eq!(mem.used, 0);
    assert_eq!(mem.percent, 0.0);
}

#[test]
fn test_primary_disk_is_largest_by_size() {
    let disks = vec![
        common::disk("/dev/a", "/a", 100),
        common::disk("/dev/b", "/b", 500),
        common::disk("/dev/c", "/c", 200),
    ];
    let primary = primary_disk(&disks).expect("primary");
    assert_eq!(primary.size, 500);
    assert_eq!(primary.mount, "/b");
}

#[test]
fn test_primary_disk_tie_keeps_first_encountered() {
    let disks = vec![
        common::disk("/dev/a", "/a", 500),
        common::disk("/dev/b", "/b", 500),
    ];
    let primary = primary_disk(&disks).expect("primary");
    assert_eq!(primary.mount, "/a");
}

#[test]
fn test_primary_disk_empty_is_none() {
    assert!(primary_disk(&[]).is_none());
}

#[test]
fn test_normalize_filesystems_defaults_type_and_derives_available() {
    let records = normalize_filesystems(vec![FilesystemReading {
        fs: "/dev/x".into(),
        mount: "/".into(),
        type_: None,
        size: 1000,
        used: 400,
        use_percent: 40.0,
    }]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].type_, "volume");
    assert_eq!(records[0].available, 600);
    assert_eq!(records[0].use_percent, 40.0);
}

#[test]
fn test_build_payload_end_to_end() {
    let disks = normalize_filesystems(vec![FilesystemReading {
        fs: "/dev/x".into(),
        mount: "/".into(),
        type_: Some("apfs".into()),
        size: 1000,
        used: 400,
        use_percent: 40.0,
    }]);
    let payload = build_payload(
        &[10.0, 20.0, 30.0],
        MemoryReading {
            total: 16_000_000_000,
            available: 8_000_000_000,
        },
        disks,
    );
    assert_eq!(payload.kind, MetricsPayload::KIND);
    assert_eq!(payload.cpu, 20);
    assert_eq!(payload.memory.total, 16_000_000_000);
    assert_eq!(payload.memory.used, 8_000_000_000);
    assert_eq!(payload.memory.free, 8_000_000_000);
    assert_eq!(payload.memory.percent, 50.0);
    assert_eq!(payload.disks.len(), 1);
    assert_eq!(payload.disks[0].use_percent, 40.0);
    let primary = payload.primary_disk.expect("primary");
    assert_eq!(primary, payload.disks[0]);
}

#[test]
fn test_build_payload_empty_disks_has_no_primary() {
    let payload = build_payload(
        &[5.0],
        MemoryReading {
            total: 100,
            available: 50,
        },
        vec![],
    );
    assert!(payload.primary_disk.is_none());
    assert!(payload.disks.is_empty());
}
