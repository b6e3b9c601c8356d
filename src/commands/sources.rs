use tauri::{command, AppHandle};

use crate::capture::{CaptureSource, CaptureSourceProvider, MonitorSourceProvider, SourceKind};
use crate::error::AppError;

/// Enumerates capture targets. Re-run on demand; results are never cached,
/// and a platform permission denial surfaces as the error string.
#[command]
pub fn list_capture_sources(
    app: AppHandle,
    kinds: Vec<SourceKind>,
) -> Result<Vec<CaptureSource>, AppError> {
    MonitorSourceProvider::new(app).list_sources(&kinds)
}
