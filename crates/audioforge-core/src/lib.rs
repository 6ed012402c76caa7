//! audioforge-core: shared types, errors, and path utilities.
//!
//! This crate is the foundational dependency for the other audioforge
//! crates, providing:
//!
//! - **Tasks and outcomes**: the unit of work handed to the scheduler and
//!   the terminal result it produces
//! - **Path utilities**: source-file detection and input-to-output mapping
//! - **Pool sizing**: the CPU-based concurrency heuristic
//! - **Error handling**: a unified error type and result alias
//!
//! # Examples
//!
//! ```
//! use audioforge_core::{paths, Task};
//! use std::path::Path;
//!
//! let output = paths::map_output_path(
//!     Path::new("input"),
//!     Path::new("output"),
//!     Path::new("input/album/01.flac"),
//!     "m4a",
//! )
//! .unwrap();
//! assert_eq!(output, Path::new("output/album/01.m4a"));
//!
//! let task = Task::new("input/album/01.flac", &output, "album/01.flac", 1, 1);
//! assert_eq!(task.label(), "[1/1]");
//! ```

pub mod error;
pub mod limits;
pub mod paths;
pub mod task;

pub use error::{Error, Result};
pub use limits::{default_max_concurrent, effective_max_concurrent};
pub use task::{Outcome, OutcomeStatus, Task};
