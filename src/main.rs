mod cli;

use audioforge::{
    batch::{self, InstallPolicy},
    config,
    report::StatusReporter,
};
use audioforge_av::{check_tool_with_arg, EncoderProvisioner, PackageManager, SystemProvisioner};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConvertArgs};
use std::path::Path;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "audioforge=debug,audioforge_av=debug,audioforge_core=debug".to_string()
        } else {
            "audioforge=info,audioforge_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => convert(&cli.convert, cli.config.as_deref()),
        Some(Commands::Convert(args)) => convert(&args, cli.config.as_deref()),
        Some(Commands::CheckTools) => check_tools(cli.config.as_deref()),
        Some(Commands::Validate {
            config: config_path,
        }) => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn convert(args: &ConvertArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    args.apply(&mut config);
    config::validate_config(&config)?;

    let provisioner =
        SystemProvisioner::new(config.tools.ffmpeg_path.clone()).assume_yes(args.yes);
    let install = if args.no_install {
        InstallPolicy::Forbid
    } else {
        InstallPolicy::Allow
    };

    let prepared = batch::prepare(&config, &provisioner, install)?;

    let mut reporter = StatusReporter::stdout();
    let Some(converter) = prepared.ffmpeg_converter(&config) else {
        reporter.nothing_to_do(&config.encoder.source_extension)?;
        return Ok(());
    };

    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(async {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; stopping after in-flight conversions are aborted");
                on_interrupt.cancel();
            }
        });

        prepared.execute(converter, &mut reporter, cancel).await
    })?;

    if config.batch.fail_on_error && summary.has_failures() {
        anyhow::bail!(
            "{} of {} conversion(s) failed",
            summary.failed,
            summary.total()
        );
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let program = config
        .tools
        .ffmpeg_path
        .clone()
        .unwrap_or_else(|| audioforge_av::ENCODER.into());
    let info = check_tool_with_arg(&program, "-version");
    let provisioner = SystemProvisioner::new(config.tools.ffmpeg_path.clone());

    if info.available {
        print!("✓ {}", info.name);
        if let Some(ref version) = info.version {
            print!(" ({})", version);
        }
        if let Some(ref path) = info.path {
            print!(" - {}", path.display());
        }
        println!();
    } else {
        println!("✗ {}", info.name);
    }

    match PackageManager::detect() {
        Some(pm) => println!("✓ installer: {}", pm.install_command().join(" ")),
        None => println!("✗ installer: no supported package manager found"),
    }

    println!();
    if provisioner.encoder_available() {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Run audioforge to install it, or install it manually.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Input: {:?}", config.batch.input_dir);
            println!("  Output: {:?}", config.batch.output_dir);
            println!(
                "  Conversion: .{} -> .{} ({})",
                config.encoder.source_extension,
                config.encoder.target_extension,
                config.encoder.codec
            );
            match config.batch.max_concurrent {
                Some(n) => println!("  Parallel jobs: {}", n.max(1)),
                None => println!(
                    "  Parallel jobs: {} (from CPU count)",
                    audioforge_core::default_max_concurrent()
                ),
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!(
                "  Conversion: .{} -> .{} ({})",
                config.encoder.source_extension,
                config.encoder.target_extension,
                config.encoder.codec
            );
        }
    }

    Ok(())
}
