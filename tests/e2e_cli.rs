//! CLI end-to-end tests
//!
//! Tests for the audioforge command-line interface. Conversion runs use a
//! shell script standing in for ffmpeg, so they only run on unix.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the audioforge binary
#[allow(deprecated)]
fn audioforge_cmd() -> Command {
    Command::cargo_bin("audioforge").unwrap()
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = audioforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audioforge"))
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--jobs"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = audioforge_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("audioforge"));
}

#[test]
fn test_cli_convert_help() {
    let mut cmd = audioforge_cmd();
    cmd.args(["convert", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-install"));
}

#[test]
fn test_cli_missing_input_directory_fails() {
    let temp = tempdir().unwrap();

    let mut cmd = audioforge_cmd();
    cmd.current_dir(temp.path())
        .arg("--no-install")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input directory does not exist"));

    assert!(!temp.path().join("output").exists());
}

#[test]
fn test_cli_empty_input_directory_succeeds() {
    let temp = tempdir().unwrap();
    fs::create_dir(temp.path().join("input")).unwrap();
    fs::write(temp.path().join("input/notes.txt"), b"not audio").unwrap();

    let mut cmd = audioforge_cmd();
    cmd.current_dir(temp.path())
        .arg("--no-install")
        .assert()
        .success()
        .stdout(predicate::str::contains("No input files found (looking for .flac)"));
}

#[test]
fn test_cli_unavailable_encoder_without_install_fails() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("input");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("track.flac"), b"x").unwrap();

    let config_file = temp.path().join("config.toml");
    write_config(
        &config_file,
        temp.path(),
        &temp.path().join("missing/ffmpeg"),
        "",
    );

    let mut cmd = audioforge_cmd();
    cmd.args(["--config", config_file.to_str().unwrap(), "--no-install"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("installation disabled"));
}

#[test]
fn test_cli_colliding_outputs_fail_before_converting() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("input");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("track.flac"), b"x").unwrap();
    fs::write(input.join("track.FLAC"), b"y").unwrap();
    if fs::read_dir(&input).unwrap().count() < 2 {
        return;
    }

    let mut cmd = audioforge_cmd();
    cmd.current_dir(temp.path())
        .arg("--no-install")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("collides with"));

    assert!(!temp.path().join("output").exists());
}

#[test]
fn test_cli_validate_config() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("config.toml");

    fs::write(
        &config_file,
        r#"
[batch]
input_dir = "lossless"
output_dir = "portable"
max_concurrent = 3

[encoder]
source_extension = "wav"
target_extension = "ogg"
codec = "libvorbis"
"#,
    )
    .unwrap();

    let mut cmd = audioforge_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains(".wav -> .ogg (libvorbis)"))
        .stdout(predicate::str::contains("Parallel jobs: 3"));
}

#[test]
fn test_cli_validate_invalid_toml() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("bad.toml");
    fs::write(&config_file, "this is not [valid toml").unwrap();

    let mut cmd = audioforge_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .code(1);
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = audioforge_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"))
        .stdout(predicate::str::contains("installer"));
}

fn write_config(config_file: &Path, root: &Path, ffmpeg: &Path, batch_extra: &str) {
    fs::write(
        config_file,
        format!(
            r#"
[batch]
input_dir = "{input}"
output_dir = "{output}"
max_concurrent = 2
{batch_extra}

[tools]
ffmpeg_path = "{ffmpeg}"
"#,
            input = root.join("input").display(),
            output = root.join("output").display(),
            ffmpeg = ffmpeg.display(),
        ),
    )
    .unwrap();
}

#[cfg(unix)]
mod conversion {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Copies its input to its output, failing for inputs named `*bad*`.
    const FAKE_FFMPEG: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
    echo "ffmpeg version 0.0-test"
    exit 0
fi
input=""
prev=""
for arg in "$@"; do
    if [ "$prev" = "-i" ]; then input="$arg"; fi
    prev="$arg"
    output="$arg"
done
case "$input" in
    *bad*) echo "$input: Invalid data found when processing input" >&2; exit 1 ;;
esac
cp "$input" "$output"
"#;

    struct Library {
        temp: tempfile::TempDir,
        config: std::path::PathBuf,
    }

    impl Library {
        fn output(&self) -> std::path::PathBuf {
            self.temp.path().join("output")
        }
    }

    fn library(batch_extra: &str) -> Library {
        let temp = tempdir().unwrap();
        let root = temp.path();

        let ffmpeg = root.join("fake-ffmpeg");
        fs::write(&ffmpeg, FAKE_FFMPEG).unwrap();
        fs::set_permissions(&ffmpeg, fs::Permissions::from_mode(0o755)).unwrap();

        let input = root.join("input");
        fs::create_dir_all(input.join("a")).unwrap();
        fs::create_dir_all(input.join("b/deep")).unwrap();
        fs::write(input.join("a/bad.flac"), b"corrupt").unwrap();
        fs::write(input.join("a/one.flac"), b"one").unwrap();
        fs::write(input.join("b/deep/two.FLAC"), b"two").unwrap();
        fs::write(input.join("three.flac"), b"three").unwrap();
        fs::write(input.join("cover.jpg"), b"jpeg").unwrap();

        let config = root.join("config.toml");
        write_config(&config, root, &ffmpeg, batch_extra);

        Library { temp, config }
    }

    #[test]
    fn test_cli_converts_tree_and_reports_each_file() {
        let lib = library("");

        let mut cmd = audioforge_cmd();
        cmd.args(["--config", lib.config.to_str().unwrap(), "--no-install"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Converting 4 file(s) with 2 parallel job(s)",
            ))
            .stdout(predicate::str::contains("[1/4] a/bad.flac error"))
            .stdout(predicate::str::contains("[2/4] a/one.flac ok"))
            .stdout(predicate::str::contains("[3/4] b/deep/two.FLAC ok"))
            .stdout(predicate::str::contains("[4/4] three.flac ok"))
            .stdout(predicate::str::contains("Done: 3 ok, 1 failed"));

        let out = lib.output();
        assert_eq!(fs::read(out.join("a/one.m4a")).unwrap(), b"one");
        assert_eq!(fs::read(out.join("b/deep/two.m4a")).unwrap(), b"two");
        assert_eq!(fs::read(out.join("three.m4a")).unwrap(), b"three");
        assert!(!out.join("a/bad.m4a").exists());
        assert!(!out.join("cover.jpg").exists());
    }

    #[test]
    fn test_cli_fail_on_error_sets_exit_status() {
        let lib = library("");

        let mut cmd = audioforge_cmd();
        cmd.args([
            "--config",
            lib.config.to_str().unwrap(),
            "--no-install",
            "--fail-on-error",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Done: 3 ok, 1 failed"))
        .stderr(predicate::str::contains("1 of 4 conversion(s) failed"));
    }

    #[test]
    fn test_cli_fail_on_error_from_config() {
        let lib = library("fail_on_error = true");

        let mut cmd = audioforge_cmd();
        cmd.args(["--config", lib.config.to_str().unwrap(), "convert", "--no-install"])
            .assert()
            .code(1);
    }

    #[test]
    fn test_cli_jobs_flag_overrides_config() {
        let lib = library("");

        let mut cmd = audioforge_cmd();
        cmd.args([
            "--config",
            lib.config.to_str().unwrap(),
            "--no-install",
            "-j",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("with 1 parallel job(s)"));
    }

    #[test]
    fn test_cli_check_tools_reports_configured_encoder() {
        let lib = library("");

        let mut cmd = audioforge_cmd();
        cmd.args(["--config", lib.config.to_str().unwrap(), "check-tools"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ffmpeg version 0.0-test"))
            .stdout(predicate::str::contains("All required tools are available!"));
    }
}
