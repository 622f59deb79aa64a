use std::path::Path;

/// Conventional source directories probed for Node projects, in target order.
pub const NODE_SOURCE_DIRS: &[&str] = &[
    "src",
    "lib",
    "app",
    "components",
    "pages",
    "server",
    "client",
    "scripts",
    "test",
    "tests",
    "__tests__",
    "e2e",
];

/// Conventional source directories probed for Python projects.
pub const PYTHON_SOURCE_DIRS: &[&str] = &["src", "app", "lib", "scripts", "tests", "test"];

/// Build output, caches and dependencies. Never a lint or format target.
pub const DENYLIST: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "coverage",
    ".next",
    "out",
    ".git",
    ".cache",
    "reports",
    "playwright-report",
    "test-results",
    ".venv",
    "venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "htmlcov",
    "target",
];

/// Resolve the directories that format and lint steps should target.
///
/// Candidates are `src`, then the allowlist, then `includes`. A candidate is
/// kept when it is an existing directory under `root`, has no denylisted
/// path component and is not named in `excludes`. When nothing survives,
/// the allowlist directories that exist are returned with user filters
/// ignored.
pub fn resolve_source_dirs(
    root: &Path,
    allowlist: &[&str],
    src: Option<&str>,
    includes: &[String],
    excludes: &[String],
) -> Vec<String> {
    let excludes: Vec<String> = excludes.iter().filter_map(|e| normalize(e)).collect();

    let candidates = src
        .into_iter()
        .chain(allowlist.iter().copied())
        .chain(includes.iter().map(String::as_str));

    let mut dirs = Vec::new();
    for candidate in candidates {
        let Some(name) = normalize(candidate) else {
            continue;
        };
        if dirs.contains(&name) || excludes.contains(&name) || is_denied(&name) {
            continue;
        }
        if root.join(&name).is_dir() {
            dirs.push(name);
        } else {
            tracing::debug!(dir = %name, "source directory not present, dropped");
        }
    }

    if dirs.is_empty() {
        dirs = allowlist
            .iter()
            .filter(|d| root.join(d).is_dir())
            .map(|d| d.to_string())
            .collect();
        if !dirs.is_empty() {
            tracing::info!(?dirs, "no directories left after filtering, using defaults");
        }
    }

    dirs
}

/// Whether any component of a relative path is on the denylist.
pub fn is_denied(path: &str) -> bool {
    path.split('/').any(|part| DENYLIST.contains(&part))
}

/// Normalise a user-supplied directory name: `./src/` and `src\\` both
/// become `src`. Returns `None` for names that reduce to nothing, point
/// outside the root, or are absolute.
fn normalize(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    if unified.starts_with('/') {
        return None;
    }
    let parts: Vec<&str> = unified
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    if parts.is_empty() || parts.contains(&"..") {
        return None;
    }
    Some(parts.join("/"))
}
