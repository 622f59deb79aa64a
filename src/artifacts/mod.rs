// Report collection after a run, and `--clean`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::config::{Config, Ecosystem};
use crate::pipeline::PLAYWRIGHT_REPORT;
use crate::style;

/// Where copied reports land, relative to the project root.
pub const REPORTS_DIR: &str = "reports";

const COVERAGE_REPORTS: &[&str] = &[
    "coverage/index.html",
    "coverage/lcov-report/index.html",
    "htmlcov/index.html",
    "coverage.xml",
];

const NODE_ARTIFACTS: &[&str] = &[
    "coverage",
    "reports",
    ".nyc_output",
    "playwright-report",
    "test-results",
];

const PYTHON_ARTIFACTS: &[&str] = &[
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "*.egg-info",
    ".coverage",
    "htmlcov",
    "coverage.xml",
    "coverage.json",
    "reports",
];

/// Copy the browser-test report into [`REPORTS_DIR`] and list coverage
/// reports that the test tools left behind.
///
/// The browser-test report is only taken when `e2e_ran`. A failed copy is
/// reported as a warning; it never fails the run.
pub fn collect_reports<W: Write>(
    config: &Config,
    e2e_ran: bool,
    out: &mut W,
) -> io::Result<Vec<PathBuf>> {
    let root = config.root.as_path();
    let mut collected = Vec::new();

    let e2e_report = root.join(PLAYWRIGHT_REPORT);
    if e2e_ran && e2e_report.is_file() {
        match copy_into_reports(root, &e2e_report) {
            Ok(dest) => {
                writeln!(
                    out,
                    "{} browser-test report: {}",
                    style::ok(config.color),
                    relative(root, &dest)
                )?;
                collected.push(dest);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not copy browser-test report");
                writeln!(
                    out,
                    "{} could not copy browser-test report: {e:#}",
                    style::warn(config.color)
                )?;
            }
        }
    }

    for rel in COVERAGE_REPORTS {
        let path = root.join(rel);
        if path.is_file() {
            writeln!(out, "{} coverage report: {rel}", style::ok(config.color))?;
            collected.push(path);
        }
    }

    Ok(collected)
}

fn copy_into_reports(root: &Path, source: &Path) -> Result<PathBuf> {
    let dir = root.join(REPORTS_DIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let name = source
        .file_name()
        .context("report path has no file name")?;
    let dest = dir.join(name);
    std::fs::copy(source, &dest)
        .with_context(|| format!("failed to copy {} to {}", source.display(), dest.display()))?;
    Ok(dest)
}

/// Remove build and test artifacts from the project root.
///
/// Only direct children of the root that match the ecosystem's artifact
/// list are removed; `node_modules` and `.venv` are not on either list.
/// Returns what was removed.
pub fn clean(root: &Path, ecosystem: Ecosystem) -> Result<Vec<PathBuf>> {
    let patterns = match ecosystem {
        Ecosystem::Node => NODE_ARTIFACTS,
        Ecosystem::Python => PYTHON_ARTIFACTS,
    };

    let mut targets = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker.into_iter().filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy();
        if !patterns.iter().any(|p| matches_pattern(p, &name)) {
            continue;
        }
        targets.push(entry.into_path());
    }

    for path in &targets {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        result.with_context(|| format!("failed to remove {}", path.display()))?;
        tracing::info!(path = %path.display(), "removed");
    }

    Ok(targets)
}

/// Exact name, or `*suffix`.
fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.strip_prefix('*') {
        Some(suffix) => name.ends_with(suffix) && name.len() > suffix.len(),
        None => pattern == name,
    }
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn copies_browser_report() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("test-results")).unwrap();
        fs::write(dir.path().join(PLAYWRIGHT_REPORT), r#"{"suites": []}"#).unwrap();

        let cfg = Config::for_root(dir.path());
        let mut out = Vec::new();
        let collected = collect_reports(&cfg, true, &mut out).unwrap();

        let dest = dir.path().join("reports/playwright-results.json");
        assert_eq!(collected, vec![dest.clone()]);
        assert_eq!(fs::read_to_string(dest).unwrap(), r#"{"suites": []}"#);
        assert!(
            String::from_utf8(out)
                .unwrap()
                .contains("reports/playwright-results.json")
        );
    }

    #[test]
    fn browser_report_left_alone_without_e2e() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("test-results")).unwrap();
        fs::write(dir.path().join(PLAYWRIGHT_REPORT), "{}").unwrap();

        let cfg = Config::for_root(dir.path());
        let mut out = Vec::new();
        assert!(collect_reports(&cfg, false, &mut out).unwrap().is_empty());
        assert!(!dir.path().join(REPORTS_DIR).exists());
    }

    #[test]
    fn lists_existing_coverage_reports() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("htmlcov")).unwrap();
        fs::write(dir.path().join("htmlcov/index.html"), "<html/>").unwrap();
        fs::write(dir.path().join("coverage.xml"), "<coverage/>").unwrap();

        let cfg = Config::for_root(dir.path());
        let mut out = Vec::new();
        let collected = collect_reports(&cfg, false, &mut out).unwrap();
        assert_eq!(collected.len(), 2);
        assert!(!dir.path().join(REPORTS_DIR).exists());
    }

    #[test]
    fn nothing_to_collect() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::for_root(dir.path());
        let mut out = Vec::new();
        assert!(collect_reports(&cfg, false, &mut out).unwrap().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn clean_removes_python_artifacts_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for d in [".pytest_cache", "__pycache__", "demo.egg-info", ".venv", "src"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        fs::write(root.join(".coverage"), "").unwrap();
        fs::write(root.join("coverage.json"), "{}").unwrap();
        fs::write(root.join("pyproject.toml"), "").unwrap();

        let removed = clean(root, Ecosystem::Python).unwrap();
        assert_eq!(removed.len(), 5);
        assert!(!root.join(".pytest_cache").exists());
        assert!(!root.join("demo.egg-info").exists());
        assert!(!root.join(".coverage").exists());
        assert!(root.join(".venv").exists());
        assert!(root.join("src").exists());
        assert!(root.join("pyproject.toml").exists());
    }

    #[test]
    fn clean_node_keeps_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for d in ["coverage", "node_modules", "test-results", "src"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        let removed = clean(root, Ecosystem::Node).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(root.join("node_modules").exists());
        assert!(root.join("src").exists());
    }

    #[test]
    fn pattern_matching() {
        assert!(matches_pattern("*.egg-info", "demo.egg-info"));
        assert!(!matches_pattern("*.egg-info", ".egg-info"));
        assert!(matches_pattern("coverage", "coverage"));
        assert!(!matches_pattern("coverage", "coverage.json"));
    }
}
