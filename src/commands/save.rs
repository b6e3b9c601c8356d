use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tauri::{command, AppHandle, Emitter, State};
use tauri_plugin_dialog::DialogExt;

use crate::error::AppError;
use crate::ffmpeg::commands::OutputFormat;
use crate::ffmpeg::save::{save_recording, SaveRequest};
use crate::state::AppState;

/// The save boundary speaks a success flag plus human-readable text, never
/// structured error codes.
#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct SaveFinishedEvent {
    success: bool,
    path: String,
}

#[derive(Debug, Serialize)]
struct SaveMetadata {
    saved_at: String,
    format: OutputFormat,
    resolution: String,
    bitrate_kbps: u64,
}

/// Native save dialog for the chosen container; cancellation yields None.
#[command]
pub fn show_save_dialog(app: AppHandle, state: State<'_, AppState>, format: String) -> Option<String> {
    let format = OutputFormat::parse(&format).unwrap_or(OutputFormat::Mp4);
    let ext = format.extension();
    let default_name = format!(
        "Capture_{}.{}",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"),
        ext
    );

    let mut dialog = app
        .dialog()
        .file()
        .add_filter("Video", &[ext])
        .set_file_name(&default_name);

    if let Ok(config) = state.config.lock() {
        let dir = PathBuf::from(&config.recording.output_path);
        if !config.recording.output_path.is_empty() && dir.exists() {
            dialog = dialog.set_directory(dir);
        }
    }

    dialog
        .blocking_save_file()
        .and_then(|p| p.as_path().map(|p| p.to_string_lossy().to_string()))
}

/// Persists a recording: `raw` from the caller, or the last finalized
/// session recording when omitted. Serialized against itself through the
/// state's save slot.
#[command]
pub async fn save_and_convert(
    app: AppHandle,
    state: State<'_, AppState>,
    destination: String,
    raw: Option<Vec<u8>>,
    format: String,
    resolution: String,
    bitrate: Option<u64>,
    preserve_aspect_ratio: bool,
) -> Result<SaveResult, AppError> {
    let _guard = match state.try_begin_save() {
        Some(guard) => guard,
        None => {
            return Ok(SaveResult {
                success: false,
                error: Some("a save is already in progress".to_string()),
            })
        }
    };

    let format = match OutputFormat::parse(&format) {
        Some(f) => f,
        None => {
            return Ok(SaveResult {
                success: false,
                error: Some(format!("unsupported output format '{}'", format)),
            })
        }
    };

    let data = match raw {
        Some(bytes) => bytes,
        None => {
            let session = state.session.lock().map_err(|e| e.to_string())?;
            match session.last_recording() {
                Some(recording) => recording.data.clone(),
                None => {
                    return Ok(SaveResult {
                        success: false,
                        error: Some("no finished recording to save".to_string()),
                    })
                }
            }
        }
    };

    let (timeout, write_metadata) = {
        let config = state.config.lock().map_err(|e| e.to_string())?;
        let secs = config.recording.transcode_timeout_secs;
        (
            (secs > 0).then(|| Duration::from_secs(secs)),
            config.recording.write_metadata,
        )
    };

    let request = SaveRequest {
        data,
        destination: PathBuf::from(&destination),
        format,
        resolution: resolution.clone(),
        bitrate_bps: bitrate,
        preserve_aspect_ratio,
        timeout,
    };

    let result = save_recording(&request).await;
    let success = result.is_ok();

    if success && write_metadata {
        write_sidecar_metadata(&request);
    }

    let _ = app.emit(
        "save-finished",
        SaveFinishedEvent {
            success,
            path: destination,
        },
    );

    Ok(SaveResult {
        success,
        error: result.err().map(|e| e.to_string()),
    })
}

/// Non-goal placeholder kept for the frontend surface; uploads are not
/// implemented.
#[command]
pub fn upload_clip() {
    log::info!("Upload clip command received (not implemented)");
}

fn write_sidecar_metadata(request: &SaveRequest) {
    let metadata = SaveMetadata {
        saved_at: chrono::Local::now().to_rfc3339(),
        format: request.format,
        resolution: request.resolution.clone(),
        bitrate_kbps: crate::ffmpeg::utils::bitrate_kbps(request.bitrate_bps),
    };

    let path = request.destination.with_extension("json");
    match serde_json::to_string_pretty(&metadata) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                log::warn!("Failed to write metadata sidecar {:?}: {}", path, e);
            }
        }
        Err(e) => log::warn!("Failed to serialize metadata sidecar: {}", e),
    }
}
