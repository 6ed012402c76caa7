use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use audioforge::config::Config;

#[derive(Parser)]
#[command(name = "audioforge")]
#[command(author, version, about = "Batch audio transcoding with parallel encoders")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub convert: ConvertArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every source file under the input directory (the default)
    Convert(ConvertArgs),

    /// Check that the encoder and an installer are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct ConvertArgs {
    /// Input directory [default: input]
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output directory [default: output]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Parallel encoder count [default: 75% of logical CPUs]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Per-file time limit in seconds, 0 disables it [default: 3600]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Exit with an error status when any file fails to convert
    #[arg(long)]
    pub fail_on_error: bool,

    /// Never try to install a missing encoder
    #[arg(long)]
    pub no_install: bool,

    /// Install a missing encoder without asking
    #[arg(short = 'y', long, conflicts_with = "no_install")]
    pub yes: bool,
}

impl ConvertArgs {
    /// Overlay command-line values onto the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref input) = self.input {
            config.batch.input_dir = input.clone();
        }
        if let Some(ref output) = self.output {
            config.batch.output_dir = output.clone();
        }
        if let Some(jobs) = self.jobs {
            config.batch.max_concurrent = Some(jobs);
        }
        if let Some(timeout) = self.timeout {
            config.batch.task_timeout_secs = timeout;
        }
        if self.fail_on_error {
            config.batch.fail_on_error = true;
        }
    }
}
