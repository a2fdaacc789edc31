#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

#[test]
fn run_loads_default_dotenv_file() {
    let dir = temp_dir();
    write_file(&dir.path().join(".env"), "ENVDOC_CLI_DEFAULT=from_default\n");

    let output = run_dotenv(
        dir.path(),
        &["run", "--", "printenv", "ENVDOC_CLI_DEFAULT"],
        None,
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "from_default");
}

#[test]
fn run_expands_placeholders_from_file_and_environment() {
    let dir = temp_dir();
    write_file(
        &dir.path().join(".env"),
        "ENVDOC_CLI_BASE=/srv\nENVDOC_CLI_EXPANDED=${ENVDOC_CLI_BASE}/$ENVDOC_CLI_PARENT\n",
    );

    let output = run_dotenv(
        dir.path(),
        &["run", "--", "printenv", "ENVDOC_CLI_EXPANDED"],
        Some(("ENVDOC_CLI_PARENT", "app")),
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "/srv/app");
}

#[test]
fn run_keeps_first_file_without_override() {
    let dir = temp_dir();
    write_file(&dir.path().join(".env.base"), "ENVDOC_CLI_PRECEDENCE=base\n");
    write_file(&dir.path().join(".env.local"), "ENVDOC_CLI_PRECEDENCE=local\n");

    let output = run_dotenv(
        dir.path(),
        &[
            "run",
            "-f",
            ".env.base,.env.local",
            "--",
            "printenv",
            "ENVDOC_CLI_PRECEDENCE",
        ],
        None,
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "base");
}

#[test]
fn run_override_flag_controls_existing_environment_precedence() {
    let dir = temp_dir();
    write_file(&dir.path().join(".env"), "ENVDOC_CLI_OVERRIDE=from_file\n");

    let without_override = run_dotenv(
        dir.path(),
        &["run", "--", "printenv", "ENVDOC_CLI_OVERRIDE"],
        Some(("ENVDOC_CLI_OVERRIDE", "from_env")),
    );
    assert_success(&without_override);
    assert_eq!(stdout_trimmed(&without_override), "from_env");

    let with_override = run_dotenv(
        dir.path(),
        &["run", "-o", "--", "printenv", "ENVDOC_CLI_OVERRIDE"],
        Some(("ENVDOC_CLI_OVERRIDE", "from_env")),
    );
    assert_success(&with_override);
    assert_eq!(stdout_trimmed(&with_override), "from_file");
}

#[test]
fn run_ignore_missing_skips_missing_selected_files() {
    let dir = temp_dir();
    write_file(&dir.path().join(".env.real"), "ENVDOC_CLI_IGNORE=loaded\n");

    let output = run_dotenv(
        dir.path(),
        &[
            "run",
            "--ignore-missing",
            "-f",
            "missing.env,.env.real",
            "--",
            "printenv",
            "ENVDOC_CLI_IGNORE",
        ],
        None,
    );

    assert_success(&output);
    assert_eq!(stdout_trimmed(&output), "loaded");
}

#[test]
fn run_without_ignore_missing_fails_when_selected_file_is_missing() {
    let dir = temp_dir();

    let output = run_dotenv(
        dir.path(),
        &[
            "run",
            "-f",
            "missing.env",
            "--",
            "printenv",
            "ENVDOC_CLI_REQUIRED",
        ],
        None,
    );

    assert!(
        !output.status.success(),
        "expected missing file to fail: stdout={:?}, stderr={:?}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn run_reports_parse_errors_with_line_numbers() {
    let dir = temp_dir();
    write_file(&dir.path().join(".env"), "OK=1\nNOEQUALSIGN\n");

    let output = run_dotenv(dir.path(), &["run", "--", "true"], None);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("parse error at line 2"),
        "expected line number in stderr: {stderr:?}"
    );
}

#[test]
fn fmt_prints_canonical_merged_form() {
    let dir = temp_dir();
    write_file(
        &dir.path().join("one.env"),
        "export PORT=3000\nHOST='localhost' # comment\n",
    );
    write_file(&dir.path().join("two.env"), "PORT: 8080\nNOTE=\"a\\tb\"\n");

    let output = run_dotenv(dir.path(), &["fmt", "-f", "one.env,two.env"], None);

    assert_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "HOST=\"localhost\"\nNOTE=\"a\\tb\"\nPORT=8080\n"
    );
}

fn run_dotenv(dir: &Path, args: &[&str], env_pair: Option<(&str, &str)>) -> Output {
    let mut command = Command::new(dotenv_bin());
    command.current_dir(dir).args(args);
    if let Some((key, value)) = env_pair {
        command.env(key, value);
    }
    command.output().expect("failed to run dotenv binary")
}

fn stdout_trimmed(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .trim_end()
        .to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success: stdout={:?}, stderr={:?}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn dotenv_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dotenv"))
}

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).expect("failed to write fixture file");
}
