//! # audioforge-av
//!
//! External encoder plumbing for audioforge.
//!
//! This crate provides functionality for:
//! - Detecting external tools on `PATH` or at configured locations
//! - Running tool processes with captured output and optional timeouts
//! - Converting one audio file through ffmpeg ([`FfmpegConverter`])
//! - Securing the encoder at startup, installing it through the host
//!   package manager when the operator agrees ([`SystemProvisioner`])
//!
//! ## Example
//!
//! ```no_run
//! use audioforge_av::{Converter, EncoderSettings, FfmpegConverter};
//! use std::path::Path;
//!
//! # async fn example() -> audioforge_core::Result<()> {
//! let converter = FfmpegConverter::new("ffmpeg", EncoderSettings::default());
//! converter
//!     .convert(Path::new("input/a.flac"), Path::new("output/a.m4a"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod encoder;
pub mod install;
pub mod tools;

pub use command::{ToolCommand, ToolOutput};
pub use encoder::{Converter, EncoderSettings, FfmpegConverter};
pub use install::{EncoderProvisioner, PackageManager, SystemProvisioner};
pub use tools::{check_tool_with_arg, require_tool, resolve_tool, ToolInfo};

/// Name of the encoder binary.
pub const ENCODER: &str = "ffmpeg";
