// Native Capture Format
// MediaRecorder in the webview hands us WebM; a save targeting webm is a
// plain copy and must never touch the transcoder.
pub const NATIVE_CONTAINER: &str = "webm";
pub const NATIVE_MIME_TYPE: &str = "video/webm;codecs=vp9";

// Capture
pub const CHUNK_TIMESLICE_MS: u32 = 200;
pub const MAX_BUFFERED_BYTES: usize = 2 * 1024 * 1024 * 1024; // 2 GiB chunk cap

// Transcode Defaults
pub const VIDEO_CODEC_H264: &str = "libx264";
pub const VIDEO_CODEC_VP9: &str = "libvpx-vp9";
pub const AUDIO_CODEC_AAC: &str = "aac";
pub const AUDIO_CODEC_OPUS: &str = "libopus";
pub const VIDEO_PRESET: &str = "fast";
pub const H264_CRF: &str = "22";
pub const VP9_CRF: &str = "32";
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const DEFAULT_BITRATE_KBPS: u64 = 5000;

// Fallback dimensions when probing fails or a resolution string is malformed
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

// Aspect Ratio Classification
// Ratios matched within tolerance before falling back to GCD reduction.
// Wide enough that 3440x1440 (2.389) lands in the 21:9 band, narrow enough
// that 1280x1024 (1.25) stays out of the 4:3 band.
pub const ASPECT_TOLERANCE: f64 = 0.06;
pub const COMMON_ASPECT_RATIOS: [(&str, f64); 4] = [
    ("16:9", 16.0 / 9.0),
    ("4:3", 4.0 / 3.0),
    ("3:2", 3.0 / 2.0),
    ("21:9", 21.0 / 9.0),
];
// Reduced fractions with a side above this are display quirks, not ratios.
pub const ASPECT_REDUCTION_CAP: u32 = 100;

// Standard resolutions offered alongside the native ones
pub const STANDARD_RESOLUTIONS: [(u32, u32); 5] = [
    (3840, 2160),
    (2560, 1440),
    (1920, 1080),
    (1280, 720),
    (854, 480),
];

// Temp file naming
pub const TEMP_PREFIX: &str = "snapscreen_raw";
pub const STAGING_PREFIX: &str = "snapscreen_rec";
