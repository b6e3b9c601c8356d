//! Streams ffmpeg diagnostic output into the log.
//!
//! Output is observability only: nothing here feeds back into control
//! decisions. Progress lines are throttled; everything else goes to debug.
//! The task keeps a short tail of recent lines so a failed transcode can
//! report what ffmpeg actually said.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStderr;
use tokio::task::JoinHandle;

const PROGRESS_LOG_INTERVAL_SECS: u64 = 5;
const ERROR_TAIL_LINES: usize = 12;

pub struct FfmpegMonitor;

impl FfmpegMonitor {
    /// Consumes the child's stderr, logging as lines arrive. The join
    /// handle yields the last few lines for failure diagnostics.
    pub fn start(stderr: ChildStderr, label: &'static str) -> JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut tail: Vec<String> = Vec::new();
            let mut last_log_time = std::time::Instant::now();
            let mut first_log = true;

            while let Ok(Some(line)) = lines.next_line().await {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                tail.push(trimmed.to_string());
                if tail.len() > ERROR_TAIL_LINES {
                    tail.remove(0);
                }

                if is_progress_line(trimmed) {
                    if first_log
                        || last_log_time.elapsed().as_secs() >= PROGRESS_LOG_INTERVAL_SECS
                    {
                        let time = extract_value(trimmed, "time=");
                        let bitrate = extract_value(trimmed, "bitrate=");
                        let speed = extract_value(trimmed, "speed=");
                        log::info!(
                            "{} | Time: {} | Bitrate: {} | Speed: {}",
                            label,
                            time.unwrap_or_else(|| "??".to_string()),
                            bitrate.unwrap_or_else(|| "N/A".to_string()),
                            speed.unwrap_or_else(|| "??".to_string())
                        );
                        last_log_time = std::time::Instant::now();
                        first_log = false;
                    }
                } else {
                    log::debug!("FFmpeg ({}): {}", label, trimmed);
                }
            }

            tail
        })
    }
}

fn is_progress_line(line: &str) -> bool {
    line.contains("time=") && line.contains("bitrate=")
}

fn extract_value(line: &str, key: &str) -> Option<String> {
    if let Some(start) = line.find(key) {
        let after_key = &line[start + key.len()..];
        // Skip leading whitespace to find the start of the value
        let value_start = after_key.find(|c: char| !c.is_whitespace()).unwrap_or(0);
        let value_part = &after_key[value_start..];

        let end = value_part
            .find(|c: char| c.is_whitespace())
            .unwrap_or(value_part.len());
        Some(value_part[..end].to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_value() {
        let line = "frame= 123 fps= 60.0 size= 1024kB time=00:00:10.00 bitrate= 2000.0kbits/s speed= 1.0x";

        assert_eq!(extract_value(line, "frame="), Some("123".to_string()));
        assert_eq!(extract_value(line, "time="), Some("00:00:10.00".to_string()));
        assert_eq!(
            extract_value(line, "bitrate="),
            Some("2000.0kbits/s".to_string())
        );
        assert_eq!(extract_value(line, "speed="), Some("1.0x".to_string()));
        assert_eq!(extract_value(line, "missing="), None);
    }

    #[test]
    fn test_is_progress_line() {
        let progress = "frame= 123 fps= 60.0 size= 1024kB time=00:00:10.00 bitrate= 2000.0kbits/s speed= 1.0x";
        assert!(is_progress_line(progress));

        let banner = "Input #0, matroska,webm, from 'input.webm':";
        assert!(!is_progress_line(banner));
    }
}
