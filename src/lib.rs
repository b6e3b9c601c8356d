use tauri::Manager;

pub mod capture;
pub mod commands;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod ffmpeg;
pub mod session;
pub mod state;

use state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_log::Builder::default()
                .targets([
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Stdout),
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("snapscreen".to_string()),
                    }),
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Webview),
                ])
                .build(),
        )
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| {
                    if event.state == tauri_plugin_global_shortcut::ShortcutState::Pressed
                        && shortcut.matches(
                            tauri_plugin_global_shortcut::Modifiers::ALT,
                            tauri_plugin_global_shortcut::Code::F10,
                        )
                    {
                        log::info!("Global stop hotkey triggered");
                        let app_handle = app.clone();
                        let state = app_handle.state::<AppState>();
                        match commands::recording::stop_recording(app_handle.clone(), state) {
                            Ok(response) => {
                                log::info!("Hotkey stop: {}", response.message)
                            }
                            Err(e) => log::error!("Hotkey stop failed: {}", e),
                        }
                    }
                })
                .build(),
        )
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            commands::sources::list_capture_sources,
            commands::resolutions::list_resolutions,
            commands::devices::get_audio_devices,
            commands::recording::begin_preview,
            commands::recording::start_recording,
            commands::recording::append_recording_chunk,
            commands::recording::stop_recording,
            commands::recording::recording_status,
            commands::save::show_save_dialog,
            commands::save::save_and_convert,
            commands::save::upload_clip,
            commands::config::get_config,
            commands::config::update_config
        ])
        .setup(|app| {
            #[cfg(debug_assertions)]
            {
                if let Some(window) = app.get_webview_window("main") {
                    window.open_devtools();
                }
            }

            // Load config
            let config = crate::config::AppConfig::load(app.handle());
            let state = app.state::<AppState>();
            match state.config.lock() {
                Ok(mut c) => *c = config,
                Err(e) => log::error!("Failed to lock config mutex: {}", e),
            }

            // Clear out staged/temp artifacts a previous run left behind
            cleanup_stale_artifacts();

            // Register Global Shortcut
            use tauri_plugin_global_shortcut::GlobalShortcutExt;
            if let Err(e) = app.handle().global_shortcut().register("Alt+F10") {
                log::error!("Failed to register global shortcut: {}", e);
            }

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

/// Temp files only matter for the lifetime of one save/session; anything
/// from an earlier pid is leftover from a crash.
fn cleanup_stale_artifacts() {
    let temp_dir = std::env::temp_dir();
    let entries = match std::fs::read_dir(&temp_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Failed to scan temp dir {:?}: {}", temp_dir, e);
            return;
        }
    };

    let own_pid = format!("_{}_", std::process::id());
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        let is_ours = name.starts_with(constants::TEMP_PREFIX)
            || name.starts_with(constants::STAGING_PREFIX);
        if is_ours && !name.contains(&own_pid) {
            log::info!("Removing stale artifact: {:?}", entry.path());
            let _ = std::fs::remove_file(entry.path());
        }
    }
}
