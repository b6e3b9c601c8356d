//! Save/Transcode Orchestrator
//!
//! Takes one finished recording buffer from temp storage to its final
//! destination, transcoding on the way unless the target container matches
//! the capture format. The temp artifact is removed on every exit path,
//! including early validation failures and panics, via the RAII guard.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{info, warn};
use tokio::process::Command;

use crate::constants::{DEFAULT_HEIGHT, DEFAULT_WIDTH, NATIVE_CONTAINER, TEMP_PREFIX};
use crate::error::AppError;
use crate::ffmpeg::commands::{OutputFormat, TranscodeCommandBuilder};
use crate::ffmpeg::monitor::FfmpegMonitor;
use crate::ffmpeg::probe;
use crate::ffmpeg::utils::{bitrate_kbps, resolve_target_dimensions, unique_temp_path};

#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub data: Vec<u8>,
    pub destination: PathBuf,
    pub format: OutputFormat,
    pub resolution: String,
    pub bitrate_bps: Option<u64>,
    pub preserve_aspect_ratio: bool,
    /// Bound on the transcoder run; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Raw recording bytes staged on disk for the duration of one save call.
/// Removal failure is logged and never surfaces: cleanup must not mask the
/// primary result.
struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    fn write(data: &[u8]) -> Result<Self, AppError> {
        let path = unique_temp_path(TEMP_PREFIX, NATIVE_CONTAINER);
        fs::write(&path, data)?;
        let artifact = Self { path };

        let written = fs::metadata(&artifact.path)?.len();
        if written == 0 || written != data.len() as u64 {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!(
                    "temp artifact size mismatch: wrote {} of {} bytes",
                    written,
                    data.len()
                ),
            )));
        }
        Ok(artifact)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temp artifact {:?}: {}", self.path, e);
            }
        }
    }
}

/// Persists a finished recording to `request.destination`.
///
/// The native-container fast path is a byte copy; everything else runs one
/// ffmpeg pass with aspect-aware scaling. Probe failures downgrade to the
/// default dimensions instead of failing the save.
pub async fn save_recording(request: &SaveRequest) -> Result<(), AppError> {
    if request.data.is_empty() {
        return Err(AppError::InvalidInput(
            "recording buffer is empty, nothing to save".to_string(),
        ));
    }

    if let Some(parent) = request.destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let artifact = TempArtifact::write(&request.data)?;

    if request.format.is_native() {
        // Same container as the recorder produced: plain copy, no ffmpeg.
        fs::copy(artifact.path(), &request.destination)?;
        info!(
            "Saved recording without transcoding to {:?}",
            request.destination
        );
        return Ok(());
    }

    let probed = match probe::probe_video(artifact.path()).await {
        Ok(meta) => {
            info!(
                "Probed recording: {}x{} pix_fmt={} dar={}",
                meta.width,
                meta.height,
                meta.pix_fmt.as_deref().unwrap_or("?"),
                meta.display_aspect_ratio.as_deref().unwrap_or("?")
            );
            Some((meta.width, meta.height))
        }
        Err(e) => {
            warn!(
                "Probe failed ({}), falling back to {}x{}",
                e, DEFAULT_WIDTH, DEFAULT_HEIGHT
            );
            None
        }
    };

    let (width, height) = resolve_target_dimensions(&request.resolution, probed);
    let kbps = bitrate_kbps(request.bitrate_bps);

    let args = TranscodeCommandBuilder::new(artifact.path(), &request.destination, request.format)
        .with_target_dimensions(width, height)
        .with_bitrate_kbps(kbps)
        .with_preserve_aspect_ratio(request.preserve_aspect_ratio)
        .build();

    info!("Transcoding with args: {:?}", args);
    run_transcode(&args, request.timeout, &request.destination).await
}

async fn run_transcode(
    args: &[String],
    timeout: Option<Duration>,
    destination: &Path,
) -> Result<(), AppError> {
    let mut child = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AppError::Ffmpeg(format!("failed to spawn ffmpeg: {}", e)))?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AppError::Ffmpeg("failed to capture ffmpeg stderr".to_string()))?;
    let tail_handle = FfmpegMonitor::start(stderr, "TRANSCODE");

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!("Transcode exceeded {:?}, killing ffmpeg", limit);
                let _ = child.kill().await;
                discard_partial_output(destination);
                return Err(AppError::Ffmpeg(format!(
                    "transcode timed out after {} seconds",
                    limit.as_secs()
                )));
            }
        },
        None => child.wait().await?,
    };

    let tail = tail_handle.await.unwrap_or_default();

    if status.success() {
        info!("Transcode finished: {:?}", destination);
        Ok(())
    } else {
        discard_partial_output(destination);
        Err(AppError::Ffmpeg(format!(
            "ffmpeg exited with {}: {}",
            status,
            tail.join(" | ")
        )))
    }
}

/// ffmpeg writes straight to the destination, so a failed run leaves a
/// corrupt file there. Remove it rather than hand the user a broken video.
fn discard_partial_output(destination: &Path) {
    if destination.exists() {
        if let Err(e) = fs::remove_file(destination) {
            warn!("Failed to remove partial output {:?}: {}", destination, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn temp_artifact_names() -> HashSet<String> {
        fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with(TEMP_PREFIX))
            .collect()
    }

    /// Other tests in this module may hold short-lived artifacts while we
    /// scan, so tolerate transient entries and only fail on ones that stay.
    fn assert_no_new_temp_artifacts(before: &HashSet<String>) {
        for _ in 0..20 {
            if temp_artifact_names().is_subset(before) {
                return;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        let leftover: Vec<_> = temp_artifact_names()
            .difference(before)
            .cloned()
            .collect();
        panic!("temp artifacts left behind: {:?}", leftover);
    }

    fn request(data: Vec<u8>, destination: PathBuf, format: OutputFormat) -> SaveRequest {
        SaveRequest {
            data,
            destination,
            format,
            resolution: "1920x1080".to_string(),
            bitrate_bps: None,
            preserve_aspect_ratio: true,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_empty_buffer_rejected_without_side_effects() {
        let dest = std::env::temp_dir().join("snapscreen_test_empty_out.webm");
        let _ = fs::remove_file(&dest);
        let before = temp_artifact_names();

        let result = save_recording(&request(Vec::new(), dest.clone(), OutputFormat::Webm)).await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(!dest.exists());
        assert_no_new_temp_artifacts(&before);
    }

    #[tokio::test]
    async fn test_native_fast_path_is_byte_identical() {
        let dest = std::env::temp_dir().join("snapscreen_test_fastpath_out.webm");
        let _ = fs::remove_file(&dest);
        let data = vec![0x1a, 0x45, 0xdf, 0xa3, 0x42, 0x86, 0x81, 0x01];
        let before = temp_artifact_names();

        save_recording(&request(data.clone(), dest.clone(), OutputFormat::Webm))
            .await
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), data);
        // Temp artifact is gone once the call returns
        assert_no_new_temp_artifacts(&before);

        let _ = fs::remove_file(&dest);
    }

    #[tokio::test]
    async fn test_fast_path_creates_destination_directory() {
        let dir = std::env::temp_dir().join("snapscreen_test_nested_dir");
        let _ = fs::remove_dir_all(&dir);
        let dest = dir.join("clips").join("out.webm");

        save_recording(&request(vec![1, 2, 3], dest.clone(), OutputFormat::Webm))
            .await
            .unwrap();
        assert!(dest.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_temp_artifact_cleanup_on_drop() {
        let path;
        {
            let artifact = TempArtifact::write(b"payload").unwrap();
            path = artifact.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_discard_partial_output_missing_file_is_noop() {
        discard_partial_output(Path::new("/nonexistent/snapscreen_partial.mp4"));
    }
}
