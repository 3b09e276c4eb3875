use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File extensions the scanner considers convertible.
const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "avi", "3gp", "flv", "mk4", "mpg"];

/// Configuration for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to the ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Extensions accepted by the scanner, lowercase without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Extension of the target container, without the dot.
    #[serde(default = "default_target_extension")]
    pub target_extension: String,

    /// Suffix appended to the source stem when naming the destination file.
    #[serde(default = "default_dest_suffix")]
    pub dest_suffix: String,

    /// Whether to probe each source with ffprobe before converting it.
    #[serde(default = "default_probe")]
    pub probe_before_convert: bool,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_extensions() -> Vec<String> {
    SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_target_extension() -> String {
    "mp4".to_string()
}

fn default_dest_suffix() -> String {
    "_converted".to_string()
}

fn default_probe() -> bool {
    true
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            extensions: default_extensions(),
            target_extension: default_target_extension(),
            dest_suffix: default_dest_suffix(),
            probe_before_convert: default_probe(),
        }
    }
}

impl ConvertConfig {
    /// Whether a file extension matches the supported set, case-insensitively.
    pub fn is_supported(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}
