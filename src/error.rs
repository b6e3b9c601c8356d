use serde::Serialize;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("FFmpeg Error: {0}")]
    Ffmpeg(String),

    #[error("Probe Error: {0}")]
    Probe(String),

    #[error("Capture Error: {0}")]
    Capture(String),

    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("State Error: {0}")]
    State(String),
}

// Allow serializing errors to send to frontend
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::State(s)
    }
}
