//! Exit codes of the `buildgate` binary.
//!
//! Python projects here point `package_runner` at a stub script, so every
//! step runs without uv, ruff, mypy or pytest installed.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use buildgate::config::{CONFIG_FILE, THRESHOLD_ENV};

fn buildgate(root: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_buildgate"));
    cmd.arg("--root")
        .arg(root)
        .args(args)
        .env_remove(THRESHOLD_ENV)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// A Python project whose runner is a shell script. The script answers
/// every tool invocation with success; the pytest call writes a
/// coverage.py summary at `lines_pct`, and any call whose arguments
/// contain `fail_on` exits 1.
fn python_project(root: &Path, lines_pct: f64, fail_on: Option<&str>) {
    fs::write(root.join("pyproject.toml"), "[project]\nname = \"demo\"\n").unwrap();
    fs::create_dir_all(root.join("src/demo")).unwrap();
    fs::create_dir_all(root.join("tests")).unwrap();

    let fail = match fail_on {
        Some(word) => format!("case \"$*\" in *{word}*) echo \"{word} failed\" >&2; exit 1 ;; esac\n"),
        None => String::new(),
    };
    let script = format!(
        "#!/bin/sh\n{fail}case \"$*\" in\n  *--cov-report=json:coverage.json*)\n    printf '%s' '{{\"totals\":{{\"percent_covered\":{lines_pct},\"covered_lines\":60,\"num_statements\":100}}}}' > coverage.json ;;\nesac\nexit 0\n"
    );
    let runner = root.join("fake-runner");
    fs::write(&runner, script).unwrap();
    fs::set_permissions(&runner, fs::Permissions::from_mode(0o755)).unwrap();

    fs::write(
        root.join(CONFIG_FILE),
        format!("package_runner: \"{}\"\n", runner.display()),
    )
    .unwrap();
}

#[test]
fn help_and_version_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    for flag in ["--help", "--version"] {
        let output = buildgate(dir.path(), &[flag]).output().unwrap();
        assert_eq!(output.status.code(), Some(0), "{flag}");
        assert!(!output.stdout.is_empty(), "{flag}");
    }
}

#[test]
fn usage_errors_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let cases: [&[&str]; 3] = [
        &["--no-such-flag"],
        &["--threshold", "seventy"],
        &["--ecosystem", "dotnet"],
    ];
    for args in cases {
        let output = buildgate(dir.path(), args).output().unwrap();
        assert_eq!(output.status.code(), Some(1), "{args:?}");
    }
}

#[test]
fn missing_root_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = buildgate(&dir.path().join("nope"), &[]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not a directory"));
}

#[test]
fn passing_run_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    python_project(dir.path(), 60.0, None);

    let output = buildgate(dir.path(), &["--threshold", "50"]).output().unwrap();
    let text = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "{text}");
    assert!(text.contains("All steps OK"));
}

#[test]
fn environment_threshold_wins_over_flag() {
    let dir = tempfile::tempdir().unwrap();
    python_project(dir.path(), 60.0, None);

    let output = buildgate(dir.path(), &["--threshold", "50"])
        .env(THRESHOLD_ENV, "80")
        .output()
        .unwrap();
    let text = stdout(&output);
    assert_eq!(output.status.code(), Some(1), "{text}");
    assert!(text.contains("is below the required 80.00%"));
    assert!(!text.contains("Summary:"));
}

#[test]
fn hard_step_failure_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    python_project(dir.path(), 90.0, Some("format"));

    let output = buildgate(dir.path(), &[]).output().unwrap();
    let text = stdout(&output);
    assert_eq!(output.status.code(), Some(1), "{text}");
    assert!(text.contains("FAIL format (exit 1)"));
    assert!(!text.contains("OK test"));
}

#[test]
fn soft_step_failure_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    python_project(dir.path(), 90.0, Some("--select"));

    let output = buildgate(dir.path(), &[]).output().unwrap();
    let text = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "{text}");
    assert!(text.contains("WARN (continuing) security (exit 1)"));
    assert!(text.contains("Completed with 1 warning(s):"));
}

#[test]
fn clean_exits_zero_and_removes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("package.json"), "{}").unwrap();
    fs::create_dir_all(root.join("coverage")).unwrap();
    fs::create_dir_all(root.join("node_modules")).unwrap();

    let output = buildgate(root, &["--clean"]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(!root.join("coverage").exists());
    assert!(root.join("node_modules").exists());
}
