//! Path utilities for source detection and output mapping.
//!
//! Output paths mirror the source's position under the input root, with the
//! extension swapped for the target container.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Check if a path has the given extension, ignoring ASCII case.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use audioforge_core::paths::has_extension;
///
/// assert!(has_extension(Path::new("track.FLAC"), "flac"));
/// assert!(!has_extension(Path::new("cover.jpg"), "flac"));
/// ```
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
        .unwrap_or(false)
}

/// Map a source file under `input_root` to its destination under
/// `output_root`, replacing the extension with `target_extension`.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `source` does not live under
/// `input_root`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use audioforge_core::paths::map_output_path;
///
/// let out = map_output_path(
///     Path::new("/music/in"),
///     Path::new("/music/out"),
///     Path::new("/music/in/Artist/Album/01 Intro.flac"),
///     "m4a",
/// )
/// .unwrap();
/// assert_eq!(out, Path::new("/music/out/Artist/Album/01 Intro.m4a"));
/// ```
pub fn map_output_path(
    input_root: &Path,
    output_root: &Path,
    source: &Path,
    target_extension: &str,
) -> Result<PathBuf> {
    let relative = relative_to(input_root, source)?;
    let mut output = output_root.join(relative);
    output.set_extension(target_extension.trim_start_matches('.'));
    Ok(output)
}

/// Return `path` relative to `root`.
pub fn relative_to<'a>(root: &Path, path: &'a Path) -> Result<&'a Path> {
    path.strip_prefix(root).map_err(|_| {
        Error::validation(format!(
            "{} is not inside {}",
            path.display(),
            root.display()
        ))
    })
}
