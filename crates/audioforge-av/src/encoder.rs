//! Audio conversion through an external encoder.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use audioforge_core::Result;

use crate::command::ToolCommand;

/// Converts one source file into one destination file.
///
/// Implementors return once the conversion has finished. Dropping the
/// returned future must stop any work it started.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `input` into `output`, overwriting any existing file.
    async fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Fixed target codec settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// ffmpeg audio encoder name (default: alac).
    pub codec: String,
    /// Target bitrate, e.g. "128k" for lossy codecs. `None` leaves the
    /// encoder default.
    pub bitrate: Option<String>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            codec: "alac".to_string(),
            bitrate: None,
        }
    }
}

/// [`Converter`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    program: PathBuf,
    settings: EncoderSettings,
}

impl FfmpegConverter {
    /// Create a converter that runs `program` (a path or a name on `PATH`).
    pub fn new(program: impl Into<PathBuf>, settings: EncoderSettings) -> Self {
        Self {
            program: program.into(),
            settings,
        }
    }

    /// Path of the ffmpeg binary this converter runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the ffmpeg argument list for one conversion.
    ///
    /// Only the audio streams of the input are mapped; video (cover art),
    /// subtitle, and data streams are dropped. The output is overwritten.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-loglevel",
            "error",
            "-y",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(input.as_os_str().to_os_string());

        args.extend(
            ["-map", "0:a", "-vn", "-sn", "-dn", "-c:a"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(OsString::from(&self.settings.codec));

        if let Some(ref bitrate) = self.settings.bitrate {
            args.push(OsString::from("-b:a"));
            args.push(OsString::from(bitrate));
        }

        args.push(output.as_os_str().to_os_string());
        args
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        ToolCommand::new(&self.program)
            .args(self.build_args(input, output))
            .execute()
            .await?;
        Ok(())
    }
}
