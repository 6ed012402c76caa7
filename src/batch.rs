//! Batch driver: environment checks, discovery, scheduling, and reporting.
//!
//! [`prepare`] runs the sequential startup work (input directory, task
//! discovery, securing the encoder) and fails with an environment error
//! before any conversion starts. [`PreparedBatch::execute`] then streams the
//! scheduler's outcomes into a [`StatusReporter`].

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use audioforge_av::{resolve_tool, Converter, EncoderProvisioner, FfmpegConverter, ENCODER};
use audioforge_core::{effective_max_concurrent, Task};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::discovery::TaskSource;
use crate::report::{StatusReporter, Summary};
use crate::scheduler::Scheduler;
use crate::worker::ConversionWorker;

/// Whether a missing encoder may be installed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPolicy {
    /// Ask the provisioner to install it.
    Allow,
    /// Fail immediately.
    Forbid,
}

/// A run that passed its environment checks.
#[derive(Debug)]
pub struct PreparedBatch {
    tasks: Vec<Task>,
    max_concurrent: usize,
    task_timeout: Option<Duration>,
    encoder_path: Option<PathBuf>,
}

/// Check the environment and discover the run's tasks.
///
/// # Errors
///
/// Fails if the input directory is missing, or if there is work to do and
/// the encoder is unavailable and cannot be installed.
pub fn prepare(
    config: &Config,
    provisioner: &dyn EncoderProvisioner,
    install: InstallPolicy,
) -> Result<PreparedBatch> {
    let batch = &config.batch;

    if !batch.input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {:?}", batch.input_dir);
    }

    let source = TaskSource::new(
        &batch.input_dir,
        &batch.output_dir,
        &config.encoder.source_extension,
        &config.encoder.target_extension,
    );
    let tasks = source
        .discover()
        .with_context(|| format!("Failed to scan {:?}", batch.input_dir))?;

    let max_concurrent = effective_max_concurrent(batch.max_concurrent);
    let task_timeout = batch.task_timeout();

    if tasks.is_empty() {
        return Ok(PreparedBatch {
            tasks,
            max_concurrent,
            task_timeout,
            encoder_path: None,
        });
    }

    if !provisioner.encoder_available() {
        match install {
            InstallPolicy::Allow => {
                warn!("{} not found; attempting installation", ENCODER);
                provisioner
                    .install_encoder()
                    .with_context(|| format!("{ENCODER} is not available and was not installed"))?;
            }
            InstallPolicy::Forbid => {
                anyhow::bail!("{ENCODER} is not available (installation disabled)");
            }
        }
    }

    let encoder_path = resolve_tool(ENCODER, config.tools.ffmpeg_path.as_deref())
        .with_context(|| format!("Failed to locate {ENCODER}"))?;
    info!("Using encoder at {:?}", encoder_path);

    Ok(PreparedBatch {
        tasks,
        max_concurrent,
        task_timeout,
        encoder_path: Some(encoder_path),
    })
}

impl PreparedBatch {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Path of the encoder the run will use, if there is any work.
    pub fn encoder_path(&self) -> Option<&std::path::Path> {
        self.encoder_path.as_deref()
    }

    /// The ffmpeg converter for this run, configured from `config`.
    pub fn ffmpeg_converter(&self, config: &Config) -> Option<Arc<dyn Converter>> {
        self.encoder_path.as_ref().map(|path| {
            Arc::new(FfmpegConverter::new(path, config.encoder.settings())) as Arc<dyn Converter>
        })
    }

    /// Run every task through `converter`, reporting as outcomes arrive.
    pub async fn execute<W: Write>(
        self,
        converter: Arc<dyn Converter>,
        reporter: &mut StatusReporter<W>,
        cancel: CancellationToken,
    ) -> Result<Summary> {
        let started = Instant::now();
        let mut summary = Summary::default();

        reporter.start(self.tasks.len(), self.max_concurrent)?;

        let worker = Arc::new(ConversionWorker::new(converter).with_timeout(self.task_timeout));
        let scheduler = Scheduler::new(self.max_concurrent).with_cancellation(cancel);

        let mut outcomes = scheduler.run(self.tasks, move |task| {
            let worker = Arc::clone(&worker);
            async move { worker.convert(task).await }
        });

        while let Some(outcome) = outcomes.next().await {
            let task = outcome.task();
            if outcome.is_success() {
                debug!(
                    "{} {} converted in {:.2}s",
                    task.label(),
                    task.relative_path().display(),
                    outcome.elapsed().as_secs_f64()
                );
            } else {
                warn!(
                    "{} {} failed after {:.2}s: {}",
                    task.label(),
                    task.relative_path().display(),
                    outcome.elapsed().as_secs_f64(),
                    outcome.detail()
                );
            }
            summary.record(&outcome);
            reporter.outcome(&outcome)?;
        }

        summary.elapsed = started.elapsed();
        reporter.finish(&summary)?;

        info!(
            "Batch complete: {} ok, {} failed",
            summary.succeeded, summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audioforge_core::Error;
    use std::cell::Cell;
    use std::fs;

    struct FakeProvisioner {
        available: Cell<bool>,
        install_ok: bool,
        install_calls: Cell<usize>,
    }

    impl FakeProvisioner {
        fn new(available: bool, install_ok: bool) -> Self {
            Self {
                available: Cell::new(available),
                install_ok,
                install_calls: Cell::new(0),
            }
        }
    }

    impl EncoderProvisioner for FakeProvisioner {
        fn encoder_available(&self) -> bool {
            self.available.get()
        }

        fn install_encoder(&self) -> audioforge_core::Result<()> {
            self.install_calls.set(self.install_calls.get() + 1);
            if self.install_ok {
                self.available.set(true);
                Ok(())
            } else {
                Err(Error::tool("installer", "declined"))
            }
        }
    }

    fn config_in(root: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.batch.input_dir = root.join("input");
        config.batch.output_dir = root.join("output");
        config
    }

    #[test]
    fn missing_input_directory_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        let provisioner = FakeProvisioner::new(true, true);

        let err = prepare(&config, &provisioner, InstallPolicy::Allow).unwrap_err();
        assert!(err.to_string().contains("Input directory does not exist"));
        assert_eq!(provisioner.install_calls.get(), 0);
    }

    #[test]
    fn empty_input_skips_encoder_checks() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.batch.input_dir).unwrap();
        let provisioner = FakeProvisioner::new(false, false);

        let prepared = prepare(&config, &provisioner, InstallPolicy::Forbid).unwrap();
        assert!(prepared.tasks().is_empty());
        assert!(prepared.encoder_path().is_none());
        assert_eq!(provisioner.install_calls.get(), 0);
    }

    #[test]
    fn unavailable_encoder_with_install_forbidden_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.batch.input_dir).unwrap();
        fs::write(config.batch.input_dir.join("a.flac"), b"x").unwrap();
        let provisioner = FakeProvisioner::new(false, true);

        let err = prepare(&config, &provisioner, InstallPolicy::Forbid).unwrap_err();
        assert!(err.to_string().contains("installation disabled"));
        assert_eq!(provisioner.install_calls.get(), 0);
    }

    #[test]
    fn declined_install_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.batch.input_dir).unwrap();
        fs::write(config.batch.input_dir.join("a.flac"), b"x").unwrap();
        let provisioner = FakeProvisioner::new(false, false);

        let err = prepare(&config, &provisioner, InstallPolicy::Allow).unwrap_err();
        assert!(err.to_string().contains("was not installed"));
        assert_eq!(provisioner.install_calls.get(), 1);
    }

    #[test]
    fn colliding_outputs_are_fatal_before_encoder_checks() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.batch.input_dir).unwrap();
        fs::write(config.batch.input_dir.join("song.flac"), b"x").unwrap();
        fs::write(config.batch.input_dir.join("song.FLAC"), b"y").unwrap();
        if fs::read_dir(&config.batch.input_dir).unwrap().count() < 2 {
            return;
        }
        let provisioner = FakeProvisioner::new(false, true);

        let err = prepare(&config, &provisioner, InstallPolicy::Allow).unwrap_err();
        assert!(format!("{err:#}").contains("collides with"), "{err:#}");
        assert_eq!(provisioner.install_calls.get(), 0);
        assert!(!config.batch.output_dir.exists());
    }

    #[test]
    fn configured_encoder_is_used() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = config_in(temp.path());
        fs::create_dir_all(&config.batch.input_dir).unwrap();
        fs::write(config.batch.input_dir.join("a.flac"), b"x").unwrap();
        let fake = temp.path().join("ffmpeg");
        fs::write(&fake, b"").unwrap();
        config.tools.ffmpeg_path = Some(fake.clone());
        config.batch.max_concurrent = Some(0);

        let prepared = prepare(&config, &FakeProvisioner::new(true, true), InstallPolicy::Allow)
            .unwrap();
        assert_eq!(prepared.tasks().len(), 1);
        assert_eq!(prepared.encoder_path(), Some(fake.as_path()));
        assert_eq!(prepared.max_concurrent(), 1);
        assert!(prepared.ffmpeg_converter(&config).is_some());
    }
}
