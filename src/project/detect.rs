use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::dirs::{NODE_SOURCE_DIRS, PYTHON_SOURCE_DIRS, resolve_source_dirs};
use super::types::{ProjectShape, TestTool};
use crate::config::{Config, Ecosystem};

/// ESLint configuration files, in lookup order. First match wins.
pub const ESLINT_CONFIGS: &[&str] = &[
    "eslint.config.js",
    "eslint.config.mjs",
    "eslint.config.cjs",
    "eslint.config.ts",
    ".eslintrc.js",
    ".eslintrc.cjs",
    ".eslintrc.json",
    ".eslintrc.yml",
    ".eslintrc.yaml",
    ".eslintrc",
];

const PLAYWRIGHT_CONFIGS: &[&str] = &[
    "playwright.config.ts",
    "playwright.config.js",
    "playwright.config.mjs",
];

/// The script `npm init` writes when no test runner is configured.
const NPM_PLACEHOLDER_TEST: &str = "echo \"Error: no test specified\" && exit 1";

/// Probe the project root and decide which steps apply.
///
/// Never fails: anything that cannot be read or parsed counts as absent.
pub fn detect(config: &Config) -> ProjectShape {
    let root = config.root.as_path();
    let ecosystem = config
        .ecosystem
        .unwrap_or_else(|| detect_ecosystem(root));

    let shape = match ecosystem {
        Ecosystem::Node => detect_node(config),
        Ecosystem::Python => detect_python(config),
    };

    tracing::info!(
        ecosystem = shape.ecosystem.as_str(),
        test_tool = shape.test_tool.as_str(),
        type_config = shape.type_config.is_some(),
        lint_config = shape.lint_config.is_some(),
        playwright = shape.has_playwright,
        source_dirs = ?shape.source_dirs,
        "project shape detected"
    );
    shape
}

/// `Python` when only `pyproject.toml` is present, otherwise `Node`.
pub fn detect_ecosystem(root: &Path) -> Ecosystem {
    if root.join("pyproject.toml").is_file() && !root.join("package.json").is_file() {
        Ecosystem::Python
    } else {
        Ecosystem::Node
    }
}

// ── Node ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PackageManifest {
    dependencies: HashMap<String, serde_json::Value>,
    dev_dependencies: HashMap<String, serde_json::Value>,
    scripts: HashMap<String, serde_json::Value>,
    eslint_config: Option<serde_json::Value>,
}

impl PackageManifest {
    fn load(root: &Path) -> Self {
        let path = root.join("package.json");
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable package.json");
                Self::default()
            }
        }
    }

    fn declares(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).and_then(|v| v.as_str())
    }

    /// Whether a package is a dependency or is invoked by any script.
    fn references(&self, name: &str) -> bool {
        self.declares(name)
            || self
                .scripts
                .values()
                .filter_map(|v| v.as_str())
                .any(|script| script.split_whitespace().any(|word| word == name))
    }
}

fn detect_node(config: &Config) -> ProjectShape {
    let root = config.root.as_path();
    let manifest = PackageManifest::load(root);

    let lint_config = first_existing(root, ESLINT_CONFIGS).or_else(|| {
        manifest
            .eslint_config
            .as_ref()
            .map(|_| root.join("package.json"))
    });

    ProjectShape {
        ecosystem: Ecosystem::Node,
        type_config: first_existing(root, &["tsconfig.json"]),
        lint_config,
        test_tool: node_test_tool(&manifest),
        has_playwright: manifest.declares("@playwright/test")
            || manifest.declares("playwright")
            || first_existing(root, PLAYWRIGHT_CONFIGS).is_some(),
        package_runner: config
            .package_runner
            .clone()
            .unwrap_or_else(|| node_package_runner(root)),
        source_dirs: resolve_source_dirs(
            root,
            NODE_SOURCE_DIRS,
            config.src_dir.as_deref(),
            &config.include_dirs,
            &config.exclude_dirs,
        ),
    }
}

fn node_test_tool(manifest: &PackageManifest) -> TestTool {
    if manifest.references("vitest") {
        return TestTool::Vitest;
    }
    if manifest.references("jest") {
        return TestTool::Jest;
    }
    match manifest.script("test") {
        Some(script) if !script.trim().is_empty() && script.trim() != NPM_PLACEHOLDER_TEST => {
            TestTool::GenericWithCoverage
        }
        _ => TestTool::None,
    }
}

fn node_package_runner(root: &Path) -> Vec<String> {
    let runner: &[&str] = if root.join("pnpm-lock.yaml").is_file() {
        &["pnpm", "exec"]
    } else if root.join("yarn.lock").is_file() {
        &["yarn"]
    } else if root.join("bun.lockb").is_file() || root.join("bun.lock").is_file() {
        &["bunx"]
    } else {
        &["npx"]
    };
    runner.iter().map(|s| s.to_string()).collect()
}

// ── Python ────────────────────────────────────────────────────────────

fn detect_python(config: &Config) -> ProjectShape {
    let root = config.root.as_path();
    let pyproject = load_pyproject(root);
    let section = |path: &[&str]| pyproject.as_ref().is_some_and(|t| has_table(t, path));

    let type_config = first_existing(root, &["mypy.ini", ".mypy.ini"])
        .or_else(|| section(&["tool", "mypy"]).then(|| root.join("pyproject.toml")))
        .or_else(|| setup_cfg_has_mypy(root).then(|| root.join("setup.cfg")));

    let lint_config = first_existing(root, &["ruff.toml", ".ruff.toml"])
        .or_else(|| section(&["tool", "ruff"]).then(|| root.join("pyproject.toml")));

    let has_tests = root.join("tests").is_dir() || root.join("test").is_dir();
    let declares_pytest = pyproject.as_ref().is_some_and(declares_pytest)
        || section(&["tool", "pytest"])
        || root.join("pytest.ini").is_file();
    let test_tool = if has_tests || declares_pytest {
        TestTool::Pytest
    } else {
        TestTool::None
    };

    ProjectShape {
        ecosystem: Ecosystem::Python,
        type_config,
        lint_config,
        test_tool,
        has_playwright: false,
        package_runner: config
            .package_runner
            .clone()
            .unwrap_or_else(|| vec!["uv".to_string(), "run".to_string()]),
        source_dirs: resolve_source_dirs(
            root,
            PYTHON_SOURCE_DIRS,
            config.src_dir.as_deref(),
            &config.include_dirs,
            &config.exclude_dirs,
        ),
    }
}

fn load_pyproject(root: &Path) -> Option<toml::Table> {
    let path = root.join("pyproject.toml");
    let raw = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<toml::Table>(&raw) {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable pyproject.toml");
            None
        }
    }
}

fn has_table(table: &toml::Table, path: &[&str]) -> bool {
    let mut current = table;
    for key in path {
        match current.get(*key).and_then(|v| v.as_table()) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

/// Looks for `pytest` in `project.dependencies`,
/// `project.optional-dependencies` and `dependency-groups`.
fn declares_pytest(table: &toml::Table) -> bool {
    let mut lists: Vec<&toml::Value> = Vec::new();
    if let Some(project) = table.get("project").and_then(|v| v.as_table()) {
        lists.extend(project.get("dependencies"));
        if let Some(optional) = project
            .get("optional-dependencies")
            .and_then(|v| v.as_table())
        {
            lists.extend(optional.values());
        }
    }
    if let Some(groups) = table.get("dependency-groups").and_then(|v| v.as_table()) {
        lists.extend(groups.values());
    }

    lists
        .into_iter()
        .filter_map(|v| v.as_array())
        .flatten()
        .filter_map(|v| v.as_str())
        .any(|req| requirement_name(req).eq_ignore_ascii_case("pytest"))
}

/// `"pytest>=8; python_version > '3.9'"` → `"pytest"`.
fn requirement_name(req: &str) -> &str {
    let end = req
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(req.len());
    &req[..end]
}

fn setup_cfg_has_mypy(root: &Path) -> bool {
    std::fs::read_to_string(root.join("setup.cfg"))
        .map(|raw| raw.lines().any(|l| l.trim() == "[mypy]"))
        .unwrap_or(false)
}

fn first_existing(root: &Path, names: &[&str]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}
