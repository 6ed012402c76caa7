//! Conversion tasks and their outcomes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One source file to convert, paired with its destination.
///
/// Tasks are created once by discovery and never mutated. The sequence
/// number is 1-based discovery order and only feeds progress labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    input_path: PathBuf,
    output_path: PathBuf,
    relative_path: PathBuf,
    sequence_number: usize,
    total_count: usize,
}

impl Task {
    /// Create a task.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        relative_path: impl Into<PathBuf>,
        sequence_number: usize,
        total_count: usize,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            relative_path: relative_path.into(),
            sequence_number,
            total_count,
        }
    }

    /// Source file path.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Destination file path.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Source path relative to the input root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// 1-based position in discovery order.
    pub fn sequence_number(&self) -> usize {
        self.sequence_number
    }

    /// Number of tasks in the run.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Progress label, e.g. `[3/12]`.
    pub fn label(&self) -> String {
        format!("[{}/{}]", self.sequence_number, self.total_count)
    }
}

/// Terminal status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

impl OutcomeStatus {
    /// Short status word used in console output.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "ok",
            OutcomeStatus::Failure => "error",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of attempting one [`Task`].
///
/// Exactly one outcome exists per task.
#[derive(Debug, Clone)]
pub struct Outcome {
    task: Task,
    status: OutcomeStatus,
    detail: String,
    elapsed: Duration,
}

impl Outcome {
    /// A successful conversion.
    pub fn success(task: Task, elapsed: Duration) -> Self {
        Self {
            task,
            status: OutcomeStatus::Success,
            detail: String::new(),
            elapsed,
        }
    }

    /// A failed conversion, with a human-readable reason.
    pub fn failure(task: Task, detail: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            task,
            status: OutcomeStatus::Failure,
            detail: detail.into(),
            elapsed,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    /// Failure reason; empty on success.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Wall time spent converting.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
