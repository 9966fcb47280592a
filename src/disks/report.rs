// df report parsing and mount exclusion rules

use crate::models::DiskRecord;

/// One filter for pseudo/system volumes. Matching is by mount path or
/// filesystem name, never heuristic.
#[derive(Debug, Clone, Copy)]
pub enum ExcludeRule {
    MountPrefix(&'static str),
    MountEquals(&'static str),
    FsEquals(&'static str),
    FsPrefix(&'static str),
}

impl ExcludeRule {
    fn matches(&self, fs: &str, mount: &str) -> bool {
        match self {
            ExcludeRule::MountPrefix(p) => mount.starts_with(p),
            ExcludeRule::MountEquals(m) => mount == *m,
            ExcludeRule::FsEquals(f) => fs == *f,
            ExcludeRule::FsPrefix(p) => fs.starts_with(p),
        }
    }
}

/// Mounts the overlay never shows: APFS system volumes, device nodes,
/// private system data, the recovery partition, and autofs map entries.
pub const DEFAULT_EXCLUDES: &[ExcludeRule] = &[
    ExcludeRule::MountPrefix("/System/Volumes"),
    ExcludeRule::MountPrefix("/dev"),
    ExcludeRule::MountPrefix("/private"),
    ExcludeRule::MountEquals("/Volumes/Recovery"),
    ExcludeRule::FsEquals("devfs"),
    ExcludeRule::FsPrefix("map"),
];

pub fn is_excluded(fs: &str, mount: &str, rules: &[ExcludeRule]) -> bool {
    rules.iter().any(|r| r.matches(fs, mount))
}

/// Parse `df -kP` output into disk records, dropping excluded mounts.
/// Lines that do not match the expected `filesystem 1K-blocks used
/// available capacity% mount` shape (header, blanks, truncated records)
/// are skipped, not errors.
pub fn parse_report(raw: &str, excludes: &[ExcludeRule]) -> Vec<DiskRecord> {
    raw.lines()
        .filter_map(|line| parse_line(line, excludes))
        .collect()
}

fn parse_line(line: &str, excludes: &[ExcludeRule]) -> Option<DiskRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return None;
    }

    // The filesystem name may contain spaces; scan for the first run of
    // three numeric fields followed by a capacity field ending in '%'.
    let i = (1..tokens.len().saturating_sub(4)).find(|&i| {
        tokens[i].parse::<u64>().is_ok()
            && tokens[i + 1].parse::<u64>().is_ok()
            && tokens[i + 2].parse::<u64>().is_ok()
            && tokens[i + 3].ends_with('%')
    })?;

    let fs = tokens[..i].join(" ");
    let mount = tokens[i + 4..].join(" ");
    if is_excluded(&fs, &mount, excludes) {
        return None;
    }

    // 1K blocks to bytes. Capacity is coerced to 0 when unparsable.
    let size = tokens[i].parse::<u64>().ok()?.saturating_mul(1024);
    let used = tokens[i + 1].parse::<u64>().ok()?.saturating_mul(1024);
    let available = tokens[i + 2].parse::<u64>().ok()?.saturating_mul(1024).min(size);
    let use_percent = tokens[i + 3]
        .trim_end_matches('%')
        .parse::<u64>()
        .unwrap_or(0) as f64;

    Some(DiskRecord {
        name: fs,
        mount,
        type_: "volume".into(),
        size,
        used,
        available,
        use_percent,
    })
}
