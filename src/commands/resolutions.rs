use tauri::{command, AppHandle, Manager};

use crate::display::{merge_resolutions, scaled_dimensions, Resolution};
use crate::error::AppError;

/// Native resolutions of every attached display merged with the standard
/// table, descending by height, deduplicated.
#[command]
pub fn list_resolutions(app: AppHandle) -> Result<Vec<Resolution>, AppError> {
    let window = app
        .get_webview_window("main")
        .ok_or_else(|| AppError::Capture("no main window".to_string()))?;
    let monitors = window
        .available_monitors()
        .map_err(|e| AppError::Capture(e.to_string()))?;

    let mut native = Vec::new();
    for monitor in &monitors {
        let scale = monitor.scale_factor();
        let logical = monitor.size().to_logical::<f64>(scale);
        let (width, height) = scaled_dimensions(logical.width, logical.height, scale);
        if width > 0 && height > 0 {
            native.push(Resolution::new(width, height, true));
        }
    }

    Ok(merge_resolutions(native))
}
