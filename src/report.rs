//! Console status output.
//!
//! One line per finished task, plus a start and a completion banner. Failure
//! details go to the log rather than to these lines.

use audioforge_core::Outcome;
use std::io::{self, Write};
use std::time::Duration;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Renders run progress to a writer (stdout in the binary).
pub struct StatusReporter<W: Write> {
    out: W,
}

impl StatusReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Banner printed before the first dispatch.
    pub fn start(&mut self, total: usize, max_concurrent: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Converting {} file(s) with {} parallel job(s)",
            total, max_concurrent
        )?;
        self.out.flush()
    }

    /// Message printed when discovery found nothing to do.
    pub fn nothing_to_do(&mut self, source_extension: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "No input files found (looking for .{})",
            source_extension.trim_start_matches('.')
        )?;
        self.out.flush()
    }

    /// `[<seq>/<total>] <relative path> <ok|error>`
    pub fn outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        let task = outcome.task();
        writeln!(
            self.out,
            "{} {} {}",
            task.label(),
            task.relative_path().display(),
            outcome.status()
        )?;
        self.out.flush()
    }

    /// Banner printed after the last outcome.
    pub fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        writeln!(
            self.out,
            "Done: {} ok, {} failed in {:.1}s",
            summary.succeeded,
            summary.failed,
            summary.elapsed.as_secs_f64()
        )?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
