//! ffprobe metadata inspection.
//!
//! Probing is advisory: the orchestrator falls back to default dimensions
//! when it fails, so every error here is an `AppError::Probe` the caller is
//! expected to swallow with a warning.

use std::path::Path;

use serde::Deserialize;
use tokio::process::Command;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub display_aspect_ratio: Option<String>,
    #[serde(default)]
    pub pix_fmt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<VideoMetadata>,
}

/// Runs ffprobe against the first video stream of `path`.
pub async fn probe_video(path: &Path) -> Result<VideoMetadata, AppError> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("v:0")
        .arg("-show_entries")
        .arg("stream=width,height,duration,display_aspect_ratio,pix_fmt")
        .arg("-of")
        .arg("json")
        .arg(path)
        .output()
        .await
        .map_err(|e| AppError::Probe(format!("failed to execute ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(AppError::Probe(format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_output(raw: &str) -> Result<VideoMetadata, AppError> {
    let parsed: ProbeOutput = serde_json::from_str(raw)
        .map_err(|e| AppError::Probe(format!("invalid ffprobe output: {}", e)))?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Probe("no video stream found".to_string()))?;

    if stream.width == 0 || stream.height == 0 {
        return Err(AppError::Probe(format!(
            "ffprobe reported degenerate dimensions {}x{}",
            stream.width, stream.height
        )));
    }

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_stream() {
        let raw = r#"{
            "streams": [{
                "width": 2560,
                "height": 1440,
                "pix_fmt": "yuv420p",
                "display_aspect_ratio": "16:9",
                "duration": "12.480000"
            }]
        }"#;
        let meta = parse_probe_output(raw).unwrap();
        assert_eq!(meta.width, 2560);
        assert_eq!(meta.height, 1440);
        assert_eq!(meta.display_aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(meta.pix_fmt.as_deref(), Some("yuv420p"));
    }

    #[test]
    fn test_parse_missing_optional_fields() {
        // WebM from MediaRecorder often has no duration in the header
        let raw = r#"{"streams": [{"width": 1280, "height": 720}]}"#;
        let meta = parse_probe_output(raw).unwrap();
        assert_eq!((meta.width, meta.height), (1280, 720));
        assert!(meta.duration.is_none());
    }

    #[test]
    fn test_parse_no_video_stream() {
        assert!(parse_probe_output(r#"{"streams": []}"#).is_err());
        assert!(parse_probe_output(r#"{}"#).is_err());
    }

    #[test]
    fn test_parse_degenerate_dimensions() {
        let raw = r#"{"streams": [{"width": 0, "height": 1080}]}"#;
        assert!(parse_probe_output(raw).is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_probe_output("not json").is_err());
    }
}
