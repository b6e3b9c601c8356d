//! Capture source enumeration.
//!
//! Actual capture and thumbnailing belong to the platform; this module only
//! models the enumerable targets and hides the platform walk behind a trait
//! so the session layer never touches windowing APIs directly.

use serde::{Deserialize, Serialize};
use tauri::Manager;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Window,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureSource {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    /// Thumbnail bytes are produced by the platform shell; empty here.
    pub thumbnail: Vec<u8>,
    pub is_primary: bool,
}

pub trait CaptureSourceProvider {
    fn list_sources(&self, kinds: &[SourceKind]) -> Result<Vec<CaptureSource>, AppError>;
}

/// Enumerates screens through the Tauri monitor API. Window targets are
/// enumerated by the webview's capture picker, not by this backend, so
/// requesting only windows yields an empty list.
pub struct MonitorSourceProvider {
    app: tauri::AppHandle,
}

impl MonitorSourceProvider {
    pub fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

impl CaptureSourceProvider for MonitorSourceProvider {
    fn list_sources(&self, kinds: &[SourceKind]) -> Result<Vec<CaptureSource>, AppError> {
        if !kinds.contains(&SourceKind::Screen) {
            return Ok(Vec::new());
        }

        let window = self
            .app
            .get_webview_window("main")
            .ok_or_else(|| AppError::Capture("no main window".to_string()))?;
        let monitors = window
            .available_monitors()
            .map_err(|e| AppError::Capture(e.to_string()))?;
        let primary = window.primary_monitor().ok().flatten();

        let mut sources = Vec::new();
        for (index, monitor) in monitors.iter().enumerate() {
            let is_primary = primary
                .as_ref()
                .map(|p| {
                    p.position().x == monitor.position().x
                        && p.position().y == monitor.position().y
                })
                .unwrap_or(false);

            sources.push(CaptureSource {
                id: format!("screen:{}", index),
                name: monitor
                    .name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("Display {}", index + 1)),
                kind: SourceKind::Screen,
                thumbnail: Vec::new(),
                is_primary,
            });
        }

        Ok(sources)
    }
}
