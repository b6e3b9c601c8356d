//! Recording session lifecycle.
//!
//! One state machine instance lives in managed state and owns every
//! session-mutating operation, so concurrent start/stop calls serialize on
//! its mutex instead of racing on shared flags:
//!
//! `Idle -> Previewing -> Recording -> Finalizing -> Idle`
//!
//! Chunks arrive in capture order from the platform recorder; finalize only
//! runs after the stream close, which the platform guarantees follows the
//! last chunk for that stream.

use std::time::Instant;

use serde::Serialize;

use crate::constants::{CHUNK_TIMESLICE_MS, MAX_BUFFERED_BYTES, NATIVE_MIME_TYPE};
use crate::display::Resolution;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Previewing,
    Recording,
    Finalizing,
}

/// Width/height pinning handed back to the platform capture call, plus the
/// timeslice the chunked recorder should use. Native resolution leaves
/// dimensions unconstrained.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreamConstraints {
    pub source_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub timeslice_ms: u32,
}

impl StreamConstraints {
    pub fn for_resolution(source_id: &str, resolution: Option<&Resolution>) -> Self {
        let exact = resolution.filter(|r| !r.is_native);
        Self {
            source_id: source_id.to_string(),
            width: exact.map(|r| r.width),
            height: exact.map(|r| r.height),
            timeslice_ms: CHUNK_TIMESLICE_MS,
        }
    }
}

/// A finalized recording: all chunks assembled into one encoded buffer.
#[derive(Debug, Clone)]
pub struct FinishedRecording {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub duration_seconds: u64,
    pub truncated: bool,
}

#[derive(Debug)]
struct ActiveSession {
    source_id: String,
    audio_device_id: Option<String>,
    chunks: Vec<Vec<u8>>,
    buffered_bytes: usize,
    truncated: bool,
    started_at: Instant,
}

/// Owns the single allowed session and the last finalized recording.
#[derive(Debug, Default)]
pub struct SessionManager {
    previewing_source: Option<String>,
    active: Option<ActiveSession>,
    finalizing: bool,
    last_recording: Option<FinishedRecording>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.finalizing {
            SessionPhase::Finalizing
        } else if self.active.is_some() {
            SessionPhase::Recording
        } else if self.previewing_source.is_some() {
            SessionPhase::Previewing
        } else {
            SessionPhase::Idle
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.active
            .as_ref()
            .map(|s| s.started_at.elapsed().as_secs())
            .unwrap_or(0)
    }

    /// Selecting a source (or changing resolution while not recording)
    /// re-opens the preview stream with fresh constraints.
    pub fn begin_preview(
        &mut self,
        source_id: &str,
        resolution: Option<&Resolution>,
    ) -> Result<StreamConstraints, AppError> {
        if self.active.is_some() || self.finalizing {
            return Err(AppError::State(
                "cannot change preview source while recording".to_string(),
            ));
        }
        self.previewing_source = Some(source_id.to_string());
        Ok(StreamConstraints::for_resolution(source_id, resolution))
    }

    /// Starts chunked capture. Single-flight: a second start is rejected
    /// without touching the session already in progress.
    pub fn start(
        &mut self,
        source_id: &str,
        audio_device_id: Option<String>,
    ) -> Result<(), AppError> {
        if self.active.is_some() || self.finalizing {
            return Err(AppError::State(
                "recording is already in progress".to_string(),
            ));
        }

        self.previewing_source = Some(source_id.to_string());
        self.active = Some(ActiveSession {
            source_id: source_id.to_string(),
            audio_device_id,
            chunks: Vec::new(),
            buffered_bytes: 0,
            truncated: false,
            started_at: Instant::now(),
        });
        Ok(())
    }

    /// Appends one encoded chunk. Returns `false` when the chunk was
    /// dropped because the in-memory cap was reached; the recording itself
    /// keeps running and finalizes with what fits.
    pub fn append_chunk(&mut self, chunk: Vec<u8>) -> Result<bool, AppError> {
        let session = self
            .active
            .as_mut()
            .ok_or_else(|| AppError::State("no recording in progress".to_string()))?;

        if session.buffered_bytes + chunk.len() > MAX_BUFFERED_BYTES {
            if !session.truncated {
                log::warn!(
                    "Recording buffer cap reached ({} bytes); dropping further chunks",
                    MAX_BUFFERED_BYTES
                );
            }
            session.truncated = true;
            return Ok(false);
        }

        session.buffered_bytes += chunk.len();
        session.chunks.push(chunk);
        Ok(true)
    }

    /// Stops and finalizes. Always proceeds with whatever chunks exist;
    /// state returns to Idle whatever the outcome.
    pub fn stop(&mut self) -> Result<FinishedRecording, AppError> {
        let session = self
            .active
            .take()
            .ok_or_else(|| AppError::State("no recording in progress".to_string()))?;
        self.finalizing = true;

        let result = Self::assemble(session);
        self.finalizing = false;

        if let Ok(recording) = &result {
            self.last_recording = Some(recording.clone());
        }
        result
    }

    fn assemble(session: ActiveSession) -> Result<FinishedRecording, AppError> {
        let duration_seconds = session.started_at.elapsed().as_secs();

        if session.chunks.is_empty() {
            return Err(AppError::Capture(
                "no data collected during recording".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(session.buffered_bytes);
        for chunk in &session.chunks {
            data.extend_from_slice(chunk);
        }

        if data.is_empty() {
            return Err(AppError::Capture("recording is empty".to_string()));
        }

        log::info!(
            "Finalized recording from {}: {} chunks, {} bytes, {}s (audio: {:?})",
            session.source_id,
            session.chunks.len(),
            data.len(),
            duration_seconds,
            session.audio_device_id
        );

        Ok(FinishedRecording {
            data,
            mime_type: NATIVE_MIME_TYPE.to_string(),
            duration_seconds,
            truncated: session.truncated,
        })
    }

    pub fn last_recording(&self) -> Option<&FinishedRecording> {
        self.last_recording.as_ref()
    }

    pub fn take_last_recording(&mut self) -> Option<FinishedRecording> {
        self.last_recording.take()
    }

    /// Drops any live session and buffered chunks (app reset).
    pub fn reset(&mut self) {
        self.previewing_source = None;
        self.active = None;
        self.finalizing = false;
    }

    #[cfg(test)]
    fn chunk_count(&self) -> usize {
        self.active.as_ref().map(|s| s.chunks.len()).unwrap_or(0)
    }
}
