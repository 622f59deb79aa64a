use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: f64 = 70.0;
pub const THRESHOLD_ENV: &str = "COVERAGE_THRESHOLD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Node,
    Python,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Node => "node",
            Ecosystem::Python => "python",
        }
    }
}

/// Contents of `.buildgate.yml`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub threshold: Option<f64>,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub run_playwright_tests: bool,
    pub ecosystem: Option<Ecosystem>,
    pub slow_test_ms: u64,
    pub slow_test_limit: usize,
    pub package_runner: Option<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            include_dirs: Vec::new(),
            exclude_dirs: Vec::new(),
            run_playwright_tests: false,
            ecosystem: None,
            slow_test_ms: 1000,
            slow_test_limit: 10,
            package_runner: None,
        }
    }
}

/// Values supplied on the command line. `None`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root: PathBuf,
    pub threshold: Option<f64>,
    pub src_dir: Option<String>,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub run_playwright_tests: bool,
    pub ecosystem: Option<Ecosystem>,
    pub fix: bool,
    pub verbose: bool,
    pub color: bool,
}

/// Resolved run configuration. Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub threshold: f64,
    pub src_dir: Option<String>,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub run_playwright_tests: bool,
    pub ecosystem: Option<Ecosystem>,
    pub fix: bool,
    pub verbose: bool,
    pub color: bool,
    pub slow_test_ms: u64,
    pub slow_test_limit: usize,
    pub package_runner: Option<Vec<String>>,
}

impl Config {
    /// Merge command-line overrides, the config file and the threshold
    /// environment variable into a single configuration.
    pub fn resolve(
        overrides: Overrides,
        file: FileConfig,
        env_threshold: Option<&str>,
    ) -> Result<Self> {
        if !overrides.root.is_dir() {
            bail!("project root is not a directory: {}", overrides.root.display());
        }

        let threshold = resolve_threshold(overrides.threshold, env_threshold, file.threshold)?;

        let package_runner = match file.package_runner.as_deref() {
            Some(raw) => {
                let words = shell_words::split(raw)
                    .with_context(|| format!("invalid package_runner: {raw:?}"))?;
                if words.is_empty() {
                    bail!("package_runner cannot be blank");
                }
                Some(words)
            }
            None => None,
        };

        Ok(Self {
            root: overrides.root,
            threshold,
            src_dir: overrides.src_dir,
            include_dirs: union(file.include_dirs, overrides.include_dirs),
            exclude_dirs: union(file.exclude_dirs, overrides.exclude_dirs),
            run_playwright_tests: overrides.run_playwright_tests || file.run_playwright_tests,
            ecosystem: overrides.ecosystem.or(file.ecosystem),
            fix: overrides.fix,
            verbose: overrides.verbose,
            color: overrides.color,
            slow_test_ms: file.slow_test_ms,
            slow_test_limit: file.slow_test_limit,
            package_runner,
        })
    }

    /// A configuration with defaults for everything but the root.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let file = FileConfig::default();
        Self {
            root: root.into(),
            threshold: DEFAULT_THRESHOLD,
            src_dir: None,
            include_dirs: Vec::new(),
            exclude_dirs: Vec::new(),
            run_playwright_tests: false,
            ecosystem: None,
            fix: false,
            verbose: false,
            color: false,
            slow_test_ms: file.slow_test_ms,
            slow_test_limit: file.slow_test_limit,
            package_runner: None,
        }
    }
}

/// Pick the coverage threshold: environment variable, then flag, then
/// config file, then [`DEFAULT_THRESHOLD`].
pub fn resolve_threshold(
    flag: Option<f64>,
    env: Option<&str>,
    file: Option<f64>,
) -> Result<f64> {
    let value = match env.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("{THRESHOLD_ENV} is not a number: {raw:?}"))?,
        None => flag.or(file).unwrap_or(DEFAULT_THRESHOLD),
    };

    if !(0.0..=100.0).contains(&value) {
        bail!("coverage threshold must be between 0 and 100, got {value}");
    }
    Ok(value)
}

/// Split a comma-separated directory list, dropping blanks.
pub fn parse_dir_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn union(mut base: Vec<String>, extra: Vec<String>) -> Vec<String> {
    for item in extra {
        if !base.contains(&item) {
            base.push(item);
        }
    }
    base
}
