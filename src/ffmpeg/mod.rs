//! FFmpeg Module
//!
//! Everything that talks to the external ffmpeg/ffprobe binaries.
//!
//! # Architecture
//!
//! * `save`: The save/transcode orchestrator. Stages raw recording bytes, decides copy vs transcode, and guarantees temp cleanup.
//! * `commands`: Builder pattern for constructing the ffmpeg CLI arguments, including the scale/letterbox filter.
//! * `probe`: ffprobe metadata inspection (dimensions, aspect ratio, pixel format).
//! * `monitor`: Streams ffmpeg stderr into the log with throttled progress lines.
//! * `utils`: Shared parsing/formatting helpers.

pub mod commands;
pub mod monitor;
pub mod probe;
pub mod save;
pub mod utils;
