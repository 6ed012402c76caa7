//! Source discovery.
//!
//! Walks the input tree and turns every matching source file into a
//! [`Task`] whose destination mirrors the file's position under the input
//! root. Directories are not created here; the worker creates each one the
//! first time a task needs it.

use audioforge_core::{paths, Error, Result, Task};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Produces the ordered task list for a run.
#[derive(Debug, Clone)]
pub struct TaskSource {
    input_root: PathBuf,
    output_root: PathBuf,
    source_extension: String,
    target_extension: String,
}

impl TaskSource {
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        source_extension: impl Into<String>,
        target_extension: impl Into<String>,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            source_extension: source_extension.into(),
            target_extension: target_extension.into(),
        }
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Enumerate source files and build one task per file.
    ///
    /// Files are sorted by path, so sequence numbers are stable between runs
    /// over the same tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the input root is missing or is not a
    /// directory, and [`Error::Validation`] if two sources would be written
    /// to the same output file.
    pub fn discover(&self) -> Result<Vec<Task>> {
        if !self.input_root.is_dir() {
            return Err(Error::not_found(
                "input directory",
                self.input_root.display(),
            ));
        }

        info!("Scanning {:?} for .{} files", self.input_root, self.source_extension);

        let mut sources = Vec::new();
        for entry in WalkDir::new(&self.input_root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if !paths::has_extension(entry.path(), &self.source_extension) {
                continue;
            }

            sources.push(entry.into_path());
        }

        sources.sort();

        let total = sources.len();
        let mut tasks = Vec::with_capacity(total);
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(total);
        for (index, source) in sources.into_iter().enumerate() {
            let relative = paths::relative_to(&self.input_root, &source)?.to_path_buf();
            let output = paths::map_output_path(
                &self.input_root,
                &self.output_root,
                &source,
                &self.target_extension,
            )?;

            // Sources differing only in extension case share one destination.
            if let Some(other) = claimed.insert(output.clone(), relative.clone()) {
                return Err(Error::validation(format!(
                    "{} collides with {}: both convert to {}",
                    relative.display(),
                    other.display(),
                    output.display()
                )));
            }
            debug!("Task {}: {:?} -> {:?}", index + 1, source, output);
            tasks.push(Task::new(source, output, relative, index + 1, total));
        }

        info!("Discovered {} source file(s)", total);
        Ok(tasks)
    }
}
