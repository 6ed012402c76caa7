//! Securing the encoder binary before a run.
//!
//! The batch driver asks an [`EncoderProvisioner`] whether the encoder is
//! present and, if not, to install it. [`SystemProvisioner`] installs ffmpeg
//! through the host package manager after the operator confirms on stdin.

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use audioforge_core::{Error, Result};

use crate::tools::check_tool_with_arg;
use crate::ENCODER;

/// Startup collaborator that makes sure the encoder can be run.
pub trait EncoderProvisioner {
    /// Whether the encoder binary is present and runnable.
    fn encoder_available(&self) -> bool;

    /// Install the encoder.
    ///
    /// # Errors
    ///
    /// Fails if the operator declines, no installer exists, or the install
    /// does not leave a runnable encoder behind.
    fn install_encoder(&self) -> Result<()>;
}

/// Package managers that can install ffmpeg, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    AptGet,
    Dnf,
    Pacman,
    Zypper,
    Brew,
    Winget,
    Choco,
    Scoop,
}

impl PackageManager {
    const ALL: [PackageManager; 8] = [
        PackageManager::AptGet,
        PackageManager::Dnf,
        PackageManager::Pacman,
        PackageManager::Zypper,
        PackageManager::Brew,
        PackageManager::Winget,
        PackageManager::Choco,
        PackageManager::Scoop,
    ];

    /// Executable name looked up on `PATH`.
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::AptGet => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Brew => "brew",
            PackageManager::Winget => "winget",
            PackageManager::Choco => "choco",
            PackageManager::Scoop => "scoop",
        }
    }

    /// Full command line that installs ffmpeg, program first.
    pub fn install_command(&self) -> Vec<&'static str> {
        match self {
            PackageManager::AptGet => vec!["sudo", "apt-get", "install", "-y", "ffmpeg"],
            PackageManager::Dnf => vec!["sudo", "dnf", "install", "-y", "ffmpeg"],
            PackageManager::Pacman => vec!["sudo", "pacman", "-S", "--noconfirm", "ffmpeg"],
            PackageManager::Zypper => vec!["sudo", "zypper", "install", "-y", "ffmpeg"],
            PackageManager::Brew => vec!["brew", "install", "ffmpeg"],
            PackageManager::Winget => vec!["winget", "install", "--id", "Gyan.FFmpeg", "-e"],
            PackageManager::Choco => vec!["choco", "install", "ffmpeg", "-y"],
            PackageManager::Scoop => vec!["scoop", "install", "ffmpeg"],
        }
    }

    /// First package manager found on `PATH`.
    pub fn detect() -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|pm| which::which(pm.binary()).is_ok())
    }
}

/// Provisioner that checks `PATH` (or a configured binary) and installs
/// through the host package manager.
#[derive(Debug, Clone, Default)]
pub struct SystemProvisioner {
    configured_path: Option<PathBuf>,
    assume_yes: bool,
}

impl SystemProvisioner {
    /// Create a provisioner. `configured_path` overrides `PATH` lookup.
    pub fn new(configured_path: Option<PathBuf>) -> Self {
        Self {
            configured_path,
            assume_yes: false,
        }
    }

    /// Skip the confirmation prompt.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    fn program(&self) -> &Path {
        self.configured_path
            .as_deref()
            .unwrap_or_else(|| Path::new(ENCODER))
    }

    fn confirm(&self, command_line: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return Err(Error::tool(
                "installer",
                "stdin is not interactive; install ffmpeg manually",
            ));
        }

        print!("{ENCODER} was not found. Install it with `{command_line}`? [y/N] ");
        std::io::stdout().flush()?;

        let mut answer = String::new();
        stdin.lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

impl EncoderProvisioner for SystemProvisioner {
    fn encoder_available(&self) -> bool {
        check_tool_with_arg(self.program(), "-version").available
    }

    fn install_encoder(&self) -> Result<()> {
        let manager = PackageManager::detect().ok_or_else(|| {
            Error::not_found("package manager", "apt-get/dnf/pacman/zypper/brew/winget/choco/scoop")
        })?;

        let command = manager.install_command();
        let command_line = command.join(" ");

        if !self.confirm(&command_line)? {
            return Err(Error::tool(manager.binary(), "installation declined"));
        }

        tracing::info!("Installing {} with `{}`", ENCODER, command_line);
        let status = Command::new(command[0]).args(&command[1..]).status().map_err(|e| {
            Error::tool(manager.binary(), format!("failed to spawn: {e}"))
        })?;

        if !status.success() {
            return Err(Error::tool(
                manager.binary(),
                format!("install exited with {status}"),
            ));
        }

        if !self.encoder_available() {
            return Err(Error::tool(
                manager.binary(),
                format!("install finished but {ENCODER} is still not runnable"),
            ));
        }

        Ok(())
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
