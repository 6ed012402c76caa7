//! Conversion worker.
//!
//! Runs one task through a [`Converter`] and folds every failure into the
//! task's [`Outcome`], so nothing past this point needs error handling.

use audioforge_av::Converter;
use audioforge_core::{Outcome, Task};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Converts single tasks, classifying the result.
pub struct ConversionWorker {
    converter: Arc<dyn Converter>,
    timeout: Option<Duration>,
}

impl ConversionWorker {
    /// Create a worker around a converter.
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self {
            converter,
            timeout: None,
        }
    }

    /// Fail any conversion that runs longer than `timeout`.
    ///
    /// The converter future is dropped on expiry, which stops the encoder.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convert one task. Never fails; errors become a failure outcome.
    pub async fn convert(&self, task: Task) -> Outcome {
        let started = Instant::now();

        if let Some(parent) = task.output_path().parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("{} cannot create {:?}: {}", task.label(), parent, e);
                return Outcome::failure(
                    task,
                    format!("failed to create output directory: {e}"),
                    started.elapsed(),
                );
            }
        }

        debug!(
            "{} converting {:?} -> {:?}",
            task.label(),
            task.input_path(),
            task.output_path()
        );

        let conversion = self
            .converter
            .convert(task.input_path(), task.output_path());

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, conversion).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {}s", limit.as_secs_f64())),
            },
            None => conversion.await.map_err(|e| e.to_string()),
        };

        let elapsed = started.elapsed();
        match result {
            Ok(()) => Outcome::success(task, elapsed),
            Err(detail) => {
                warn!("{} {:?} failed: {}", task.label(), task.relative_path(), detail);
                Outcome::failure(task, detail, elapsed)
            }
        }
    }
}
