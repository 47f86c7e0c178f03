use std::sync::OnceLock;

use regex::Regex;

use crate::error::{JettisonError, Result};

/// Parse a size literal like "512", "64K", "3MB" into bytes.
///
/// Units are case-sensitive binary multiples: `B`, `K`, `M`, `G`, `T`, each
/// optionally followed by a trailing `B`.
pub fn parse_size(s: &str) -> Result<u64> {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SIZE_RE.get_or_init(|| {
        Regex::new(r"^(\d+)(?:([KMGT])B?|B)?$").expect("size literal regex should compile")
    });

    let s = s.trim();
    let caps = re.captures(s).ok_or_else(|| JettisonError::InvalidSize {
        value: s.to_string(),
        reason: "expected digits with an optional B, K, M, G or T unit".to_string(),
    })?;

    let number: u64 = caps[1].parse().map_err(|_| JettisonError::InvalidSize {
        value: s.to_string(),
        reason: "number is out of range".to_string(),
    })?;

    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("K") => 1024,
        Some("M") => 1024 * 1024,
        Some("G") => 1024 * 1024 * 1024,
        Some("T") => 1024_u64.pow(4),
        _ => 1,
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| JettisonError::InvalidSize {
            value: s.to_string(),
            reason: "size overflows 64 bits".to_string(),
        })
}

/// Format size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}
