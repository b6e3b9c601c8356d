//! Utility functions for FFmpeg operations.
use std::path::PathBuf;

use crate::constants::{DEFAULT_BITRATE_KBPS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::display::force_even_height;

/// Parses a "WxH" resolution string into even-height dimensions.
///
/// Returns `None` for anything malformed; callers pick their own fallback
/// (the orchestrator prefers probed dimensions over the 1920x1080 default).
pub fn parse_resolution(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, force_even_height(height)))
}

/// Resolves the target dimensions for a save: the requested "WxH" string,
/// else whatever the probe saw, else 1920x1080.
pub fn resolve_target_dimensions(requested: &str, probed: Option<(u32, u32)>) -> (u32, u32) {
    parse_resolution(requested)
        .or_else(|| probed.map(|(w, h)| (w, force_even_height(h))))
        .unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT))
}

/// Converts a bits-per-second input into the kilobit figure ffmpeg takes.
/// Zero or missing means the 5000 kbps default.
pub fn bitrate_kbps(bits_per_second: Option<u64>) -> u64 {
    match bits_per_second {
        Some(bps) if bps >= 1000 => bps / 1000,
        _ => DEFAULT_BITRATE_KBPS,
    }
}

/// A fresh, uniquely named file path in the process temp directory.
/// Pid + timestamp + process-local counter keeps names unique even when
/// two artifacts are created in the same millisecond.
pub fn unique_temp_path(prefix: &str, extension: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%3f");
    std::env::temp_dir().join(format!(
        "{}_{}_{}_{}.{}",
        prefix,
        std::process::id(),
        stamp,
        COUNTER.fetch_add(1, Ordering::Relaxed),
        extension
    ))
}

/// Formats elapsed seconds as HH:MM:SS for the session status display.
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
