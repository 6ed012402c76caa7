mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./audioforge.toml", "~/.config/audioforge/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let encoder = &config.encoder;
    let source = encoder.source_extension.trim_start_matches('.');
    let target = encoder.target_extension.trim_start_matches('.');

    if source.is_empty() {
        anyhow::bail!("encoder.source_extension cannot be empty");
    }
    if target.is_empty() {
        anyhow::bail!("encoder.target_extension cannot be empty");
    }
    if source.eq_ignore_ascii_case(target) {
        anyhow::bail!(
            "encoder.source_extension and encoder.target_extension are both '{}'",
            source
        );
    }
    if encoder.codec.trim().is_empty() {
        anyhow::bail!("encoder.codec cannot be empty");
    }

    if config.batch.input_dir == config.batch.output_dir {
        anyhow::bail!(
            "batch.input_dir and batch.output_dir are the same directory: {:?}",
            config.batch.input_dir
        );
    }

    if let Some(ref path) = config.tools.ffmpeg_path {
        if !path.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
        }
    }

    Ok(())
}
