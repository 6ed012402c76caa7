use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use audioforge_av::EncoderSettings;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Root of the source tree
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Root of the mirrored destination tree
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Parallel encoder count; unset means 75% of logical CPUs
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    /// Per-file time limit in seconds, 0 disables it
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: u64,

    /// Exit non-zero when any file fails to convert
    #[serde(default)]
    pub fail_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            max_concurrent: None,
            task_timeout_secs: default_task_timeout(),
            fail_on_error: false,
        }
    }
}

impl BatchConfig {
    pub fn task_timeout(&self) -> Option<Duration> {
        (self.task_timeout_secs > 0).then(|| Duration::from_secs(self.task_timeout_secs))
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_task_timeout() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncoderConfig {
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    #[serde(default = "default_target_extension")]
    pub target_extension: String,

    /// ffmpeg audio encoder name
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Target bitrate; empty leaves the encoder default
    #[serde(default = "default_bitrate")]
    pub bitrate: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            target_extension: default_target_extension(),
            codec: default_codec(),
            bitrate: default_bitrate(),
        }
    }
}

impl EncoderConfig {
    pub fn settings(&self) -> EncoderSettings {
        EncoderSettings {
            codec: self.codec.clone(),
            bitrate: (!self.bitrate.trim().is_empty()).then(|| self.bitrate.clone()),
        }
    }
}

fn default_source_extension() -> String {
    "flac".to_string()
}

fn default_target_extension() -> String {
    "m4a".to_string()
}

fn default_codec() -> String {
    "alac".to_string()
}

fn default_bitrate() -> String {
    String::new()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}
