use cpal::traits::{DeviceTrait, HostTrait};
use tauri::command;

/// Names of the available audio input devices for the microphone picker.
#[command]
pub async fn get_audio_devices() -> Result<Vec<String>, String> {
    let host = cpal::default_host();
    let devices = host.input_devices().map_err(|e| e.to_string())?;
    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            device_names.push(name);
        }
    }
    Ok(device_names)
}
