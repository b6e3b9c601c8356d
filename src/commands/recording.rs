use std::path::PathBuf;

use serde::Serialize;
use tauri::{command, AppHandle, Emitter, State};

use crate::constants::{NATIVE_CONTAINER, STAGING_PREFIX};
use crate::display::Resolution;
use crate::error::AppError;
use crate::ffmpeg::utils::{format_elapsed, unique_temp_path};
use crate::session::{SessionPhase, StreamConstraints};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub message: String,
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordingStatus {
    pub phase: SessionPhase,
    pub elapsed_seconds: u64,
    pub elapsed: String,
}

#[derive(Debug, Clone, Serialize)]
struct RecordingFinishedEvent {
    path: Option<String>,
    duration_seconds: u64,
    truncated: bool,
}

/// Opens (or re-opens) the preview for a source; the returned constraints
/// go straight into the platform capture call.
#[command]
pub fn begin_preview(
    state: State<'_, AppState>,
    source_id: String,
    resolution: Option<Resolution>,
) -> Result<StreamConstraints, AppError> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.begin_preview(&source_id, resolution.as_ref())
}

#[command]
pub fn start_recording(
    state: State<'_, AppState>,
    source_id: String,
    audio_device_id: Option<String>,
) -> Result<SessionResponse, AppError> {
    log::info!("Start recording command received for {}", source_id);
    let mut session = state.session.lock().map_err(|e| e.to_string())?;

    match session.start(&source_id, audio_device_id) {
        Ok(()) => Ok(SessionResponse {
            success: true,
            message: "recording started".to_string(),
        }),
        Err(e) => Ok(SessionResponse {
            success: false,
            message: e.to_string(),
        }),
    }
}

/// One encoded chunk from the platform recorder, in capture order.
#[command]
pub fn append_recording_chunk(
    state: State<'_, AppState>,
    chunk: Vec<u8>,
) -> Result<bool, AppError> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.append_chunk(chunk)
}

/// Stops and finalizes the session. The assembled recording stays in state
/// for the save step; a copy is staged to disk so the UI gets a playable
/// path right away (staging failure is non-fatal).
#[command]
pub fn stop_recording(app: AppHandle, state: State<'_, AppState>) -> Result<StopResponse, AppError> {
    log::info!("Stop recording command received");
    let mut session = state.session.lock().map_err(|e| e.to_string())?;

    let response = match session.stop() {
        Ok(recording) => {
            let path = match state.staged_recording.lock() {
                Ok(mut slot) => stage_recording(&recording.data, &mut slot),
                Err(e) => {
                    log::warn!("Failed to lock staging slot: {}", e);
                    None
                }
            };
            let message = if recording.truncated {
                "recording finished (buffer cap hit, tail dropped)".to_string()
            } else {
                "recording finished".to_string()
            };

            let _ = app.emit(
                "recording-finished",
                RecordingFinishedEvent {
                    path: path.clone(),
                    duration_seconds: recording.duration_seconds,
                    truncated: recording.truncated,
                },
            );

            StopResponse {
                success: true,
                message,
                path,
            }
        }
        Err(e) => StopResponse {
            success: false,
            message: e.to_string(),
            path: None,
        },
    };

    Ok(response)
}

#[command]
pub fn recording_status(state: State<'_, AppState>) -> Result<RecordingStatus, AppError> {
    let session = state.session.lock().map_err(|e| e.to_string())?;
    let elapsed_seconds = session.elapsed_seconds();
    Ok(RecordingStatus {
        phase: session.phase(),
        elapsed_seconds,
        elapsed: format_elapsed(elapsed_seconds),
    })
}

/// Writes the staged copy and drops the one from the previous stop, so at
/// most one staged file exists per run.
fn stage_recording(data: &[u8], slot: &mut Option<PathBuf>) -> Option<String> {
    if let Some(old) = slot.take() {
        if old.exists() {
            if let Err(e) = std::fs::remove_file(&old) {
                log::warn!("Failed to remove previous staged recording {:?}: {}", old, e);
            }
        }
    }

    let path = unique_temp_path(STAGING_PREFIX, NATIVE_CONTAINER);
    match std::fs::write(&path, data) {
        Ok(()) => {
            let display = path.to_string_lossy().to_string();
            *slot = Some(path);
            Some(display)
        }
        Err(e) => {
            log::warn!("Failed to stage recording to {:?}: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_replaces_previous_file() {
        let mut slot = None;

        let first = stage_recording(&[1, 2, 3], &mut slot).unwrap();
        let second = stage_recording(&[4, 5], &mut slot).unwrap();
        assert_ne!(first, second);

        // Only the latest staged copy remains on disk
        assert!(!std::path::Path::new(&first).exists());
        assert_eq!(std::fs::read(&second).unwrap(), vec![4, 5]);
        assert_eq!(slot.as_deref(), Some(std::path::Path::new(&second)));

        let _ = std::fs::remove_file(&second);
    }
}
