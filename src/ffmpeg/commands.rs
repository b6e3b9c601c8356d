use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    AUDIO_CODEC_AAC, AUDIO_CODEC_OPUS, H264_CRF, NATIVE_CONTAINER, PIXEL_FORMAT, VIDEO_CODEC_H264,
    VIDEO_CODEC_VP9, VIDEO_PRESET, VP9_CRF,
};

/// Output containers offered by the save dialog. Each container gets the
/// codec it actually promises instead of silently producing H.264/mp4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp4,
    Mkv,
    Webm,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mp4" => Some(OutputFormat::Mp4),
            "mkv" => Some(OutputFormat::Mkv),
            "webm" => Some(OutputFormat::Webm),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Webm => "webm",
        }
    }

    /// Whether this container matches what the recorder captured, making a
    /// save a byte copy rather than a transcode.
    pub fn is_native(&self) -> bool {
        self.extension() == NATIVE_CONTAINER
    }

    fn video_codec(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 | OutputFormat::Mkv => VIDEO_CODEC_H264,
            OutputFormat::Webm => VIDEO_CODEC_VP9,
        }
    }

    fn audio_codec(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 | OutputFormat::Mkv => AUDIO_CODEC_AAC,
            OutputFormat::Webm => AUDIO_CODEC_OPUS,
        }
    }

    fn crf(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 | OutputFormat::Mkv => H264_CRF,
            OutputFormat::Webm => VP9_CRF,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscodeCommandBuilder {
    input_path: PathBuf,
    output_path: PathBuf,
    format: OutputFormat,
    target_width: u32,
    target_height: u32,
    bitrate_kbps: u64,
    preserve_aspect_ratio: bool,
}

impl TranscodeCommandBuilder {
    pub fn new(input_path: &Path, output_path: &Path, format: OutputFormat) -> Self {
        Self {
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            format,
            target_width: crate::constants::DEFAULT_WIDTH,
            target_height: crate::constants::DEFAULT_HEIGHT,
            bitrate_kbps: crate::constants::DEFAULT_BITRATE_KBPS,
            preserve_aspect_ratio: true,
        }
    }

    pub fn with_target_dimensions(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_bitrate_kbps(mut self, kbps: u64) -> Self {
        self.bitrate_kbps = kbps;
        self
    }

    pub fn with_preserve_aspect_ratio(mut self, preserve: bool) -> Self {
        self.preserve_aspect_ratio = preserve;
        self
    }

    /// The -vf scaling directive: fit-and-letterbox when preserving aspect,
    /// direct stretch otherwise.
    pub fn scale_filter(&self) -> String {
        let (w, h) = (self.target_width, self.target_height);
        if self.preserve_aspect_ratio {
            format!(
                "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"
            )
        } else {
            format!("scale={w}:{h}")
        }
    }

    pub fn build(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            // MediaRecorder blobs carry broken timestamps; regenerate them.
            "-fflags".to_string(),
            "+genpts".to_string(),
            "-i".to_string(),
            self.input_path.to_string_lossy().to_string(),
            "-vf".to_string(),
            self.scale_filter(),
            "-b:v".to_string(),
            format!("{}k", self.bitrate_kbps),
            "-c:v".to_string(),
            self.format.video_codec().to_string(),
            "-crf".to_string(),
            self.format.crf().to_string(),
            "-pix_fmt".to_string(),
            PIXEL_FORMAT.to_string(),
            "-c:a".to_string(),
            self.format.audio_codec().to_string(),
        ];

        // x264-only speed/quality knob; libvpx rejects it.
        if self.format.video_codec() == VIDEO_CODEC_H264 {
            args.push("-preset".to_string());
            args.push(VIDEO_PRESET.to_string());
        }

        // Progressive layout so mp4 output starts playing before the
        // download finishes. Meaningless for mkv/webm.
        if self.format == OutputFormat::Mp4 {
            args.push("-movflags".to_string());
            args.push("+faststart".to_string());
        }

        args.push(self.output_path.to_string_lossy().to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(format: OutputFormat) -> TranscodeCommandBuilder {
        TranscodeCommandBuilder::new(Path::new("in.webm"), Path::new("out.mp4"), format)
    }

    #[test]
    fn test_stretch_filter_has_no_pad() {
        let filter = builder(OutputFormat::Mp4)
            .with_target_dimensions(1920, 1080)
            .with_preserve_aspect_ratio(false)
            .scale_filter();
        assert_eq!(filter, "scale=1920:1080");
    }

    #[test]
    fn test_letterbox_filter() {
        let filter = builder(OutputFormat::Mp4)
            .with_target_dimensions(1920, 1080)
            .with_preserve_aspect_ratio(true)
            .scale_filter();
        assert_eq!(
            filter,
            "scale=1920:1080:force_original_aspect_ratio=decrease,pad=1920:1080:(ow-iw)/2:(oh-ih)/2"
        );
    }

    #[test]
    fn test_mp4_args() {
        let args = builder(OutputFormat::Mp4)
            .with_target_dimensions(1280, 720)
            .with_bitrate_kbps(2500)
            .build();

        assert_eq!(args[0], "-y");
        assert_eq!(args[1], "-fflags");
        assert_eq!(args[2], "+genpts");
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"2500k".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
        assert!(args.contains(&"fast".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_mkv_skips_faststart() {
        let args = builder(OutputFormat::Mkv).build();
        assert!(args.contains(&"libx264".to_string()));
        assert!(!args.contains(&"-movflags".to_string()));
    }

    #[test]
    fn test_webm_codecs() {
        let args = builder(OutputFormat::Webm).build();
        assert!(args.contains(&"libvpx-vp9".to_string()));
        assert!(args.contains(&"libopus".to_string()));
        assert!(!args.contains(&"-preset".to_string()));
        assert!(!args.contains(&"+faststart".to_string()));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("mp4"), Some(OutputFormat::Mp4));
        assert_eq!(OutputFormat::parse(" MKV "), Some(OutputFormat::Mkv));
        assert_eq!(OutputFormat::parse("webm"), Some(OutputFormat::Webm));
        assert_eq!(OutputFormat::parse("avi"), None);
        assert!(OutputFormat::Webm.is_native());
        assert!(!OutputFormat::Mp4.is_native());
    }
}
