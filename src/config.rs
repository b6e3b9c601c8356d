use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tauri::AppHandle;
use tauri::Manager;

use crate::ffmpeg::commands::OutputFormat;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub recording: RecordingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecordingConfig {
    /// Default save directory; empty means the OS video dir.
    pub output_path: String,
    pub format: OutputFormat,
    /// "WxH" or "native".
    pub resolution: Option<String>,
    /// Target bitrate in kbps; None lets the orchestrator default apply.
    pub bitrate_kbps: Option<u64>,
    #[serde(default = "default_preserve_aspect_ratio")]
    pub preserve_aspect_ratio: bool,
    pub audio_source: Option<String>,
    /// Write a sibling .json with timestamp/format/resolution per save.
    #[serde(default)]
    pub write_metadata: bool,
    /// Bound on one transcoder run in seconds; 0 waits indefinitely.
    #[serde(default)]
    pub transcode_timeout_secs: u64,
}

fn default_preserve_aspect_ratio() -> bool {
    true
}

fn default_output_path() -> String {
    if let Some(mut path) = dirs::video_dir() {
        path.push("SnapScreen");
        return path.to_string_lossy().to_string();
    }
    // Empty means "ask every time" via the save dialog
    String::new()
}

impl Default for AppConfig {
    fn default() -> Self {
        // Auto-detect default microphone
        let audio_source = cpal::default_host()
            .default_input_device()
            .map(|d| d.name().unwrap_or_default())
            .filter(|n| !n.is_empty());

        Self {
            recording: RecordingConfig {
                output_path: default_output_path(),
                format: OutputFormat::Mp4,
                resolution: Some("1920x1080".to_string()),
                bitrate_kbps: None,
                preserve_aspect_ratio: true,
                audio_source,
                write_metadata: false,
                transcode_timeout_secs: 0,
            },
        }
    }
}

impl AppConfig {
    pub fn load(app: &AppHandle) -> Self {
        let config_path = get_config_path(app);

        if let Some(path) = &config_path {
            if path.exists() {
                match fs::read_to_string(path) {
                    Ok(content) => match toml::from_str(&content) {
                        Ok(config) => return config,
                        Err(e) => log::error!("Failed to parse config file: {}", e),
                    },
                    Err(e) => log::error!("Failed to read config file: {}", e),
                }
            }
        }

        // Return default if load fails or file doesn't exist
        let default_config = Self::default();
        // Try to save the default config so the user has a file to edit
        if let Some(path) = &config_path {
            let _ = default_config.save_to_path(path);
        }

        default_config
    }

    pub fn save(&self, app: &AppHandle) -> Result<(), String> {
        let config_path = get_config_path(app).ok_or("Could not resolve config path")?;
        self.save_to_path(&config_path)
    }

    fn save_to_path(&self, path: &PathBuf) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        fs::write(path, content).map_err(|e| e.to_string())?;
        Ok(())
    }
}

fn get_config_path(app: &AppHandle) -> Option<PathBuf> {
    app.path().app_config_dir().ok().map(|p| p.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.recording.format, OutputFormat::Mp4);
        assert_eq!(config.recording.bitrate_kbps, None);
        assert!(config.recording.preserve_aspect_ratio);
        assert_eq!(config.recording.transcode_timeout_secs, 0);
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml).unwrap();

        assert_eq!(config.recording.format, deserialized.recording.format);
        assert_eq!(
            config.recording.resolution,
            deserialized.recording.resolution
        );
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let minimal = r#"
            [recording]
            output_path = ""
            format = "mkv"
        "#;
        let config: AppConfig = toml::from_str(minimal).unwrap();
        assert_eq!(config.recording.format, OutputFormat::Mkv);
        assert!(config.recording.preserve_aspect_ratio);
        assert!(!config.recording.write_metadata);
    }
}
