use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use super::types::{CoverageFormat, CoverageSummary, Metric};
use crate::config::Ecosystem;

const NODE_CANDIDATES: &[&str] = &[
    "coverage/coverage-summary.json",
    "coverage/summary/coverage-summary.json",
    "reports/coverage/coverage-summary.json",
];

const PYTHON_CANDIDATES: &[&str] = &["coverage.json", "reports/coverage.json"];

/// Conventional summary locations for an ecosystem, in lookup order.
pub fn candidates(ecosystem: Ecosystem) -> &'static [&'static str] {
    match ecosystem {
        Ecosystem::Node => NODE_CANDIDATES,
        Ecosystem::Python => PYTHON_CANDIDATES,
    }
}

/// coverage.py data and reports that a fresh run regenerates.
const PYTHON_STALE: &[&str] = &[".coverage", "htmlcov", "coverage.xml"];

/// Delete coverage output left by an earlier run so the gate only ever sees
/// what the upcoming test step writes. Returns what was removed.
///
/// Removal failures are logged and otherwise ignored.
pub fn remove_stale(root: &Path, ecosystem: Ecosystem) -> Vec<PathBuf> {
    let extra: &[&str] = match ecosystem {
        Ecosystem::Node => &[],
        Ecosystem::Python => PYTHON_STALE,
    };
    let mut removed = Vec::new();
    for rel in candidates(ecosystem).iter().chain(extra) {
        let path = root.join(rel);
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else if path.exists() {
            std::fs::remove_file(&path)
        } else {
            continue;
        };
        match result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed stale coverage output");
                removed.push(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not remove stale coverage output");
            }
        }
    }
    removed
}

/// Find the first existing coverage summary under `root`.
pub fn locate(root: &Path, ecosystem: Ecosystem) -> Option<(PathBuf, CoverageFormat)> {
    let format = match ecosystem {
        Ecosystem::Node => CoverageFormat::Istanbul,
        Ecosystem::Python => CoverageFormat::CoveragePy,
    };
    candidates(ecosystem)
        .iter()
        .map(|rel| root.join(rel))
        .find(|path| path.is_file())
        .map(|path| (path, format))
}

/// Parse a coverage summary. Missing fields read as zero; only malformed
/// JSON is an error.
pub fn parse(raw: &str, format: CoverageFormat) -> Result<CoverageSummary> {
    let doc: Value = serde_json::from_str(raw).context("coverage summary is not valid JSON")?;
    Ok(match format {
        CoverageFormat::Istanbul => parse_istanbul(&doc),
        CoverageFormat::CoveragePy => parse_coverage_py(&doc),
    })
}

/// Read and parse a summary file.
pub fn load(path: &Path, format: CoverageFormat) -> Result<CoverageSummary> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&raw, format).with_context(|| format!("failed to parse {}", path.display()))
}

/// istanbul `json-summary`:
/// `{"total": {"lines": {"total": 10, "covered": 7, "pct": 70}, ...}}`
fn parse_istanbul(doc: &Value) -> CoverageSummary {
    let total = &doc["total"];
    let metric = |name: &str| {
        let m = &total[name];
        Metric {
            pct: number(&m["pct"]),
            covered: count(&m["covered"]),
            total: count(&m["total"]),
        }
    };
    CoverageSummary {
        lines: metric("lines"),
        statements: metric("statements"),
        branches: metric("branches"),
        functions: metric("functions"),
    }
}

/// coverage.py `json` report. Statements and lines are the same measure
/// there; function coverage is not reported.
fn parse_coverage_py(doc: &Value) -> CoverageSummary {
    let totals = &doc["totals"];
    let statements = Metric {
        pct: number(&totals["percent_covered"]),
        covered: count(&totals["covered_lines"]),
        total: count(&totals["num_statements"]),
    };
    let branch_covered = count(&totals["covered_branches"]);
    let branch_total = count(&totals["num_branches"]);
    let branches = Metric {
        pct: percent(branch_covered, branch_total),
        covered: branch_covered,
        total: branch_total,
    };
    CoverageSummary {
        lines: statements,
        statements,
        branches,
        functions: Metric::default(),
    }
}

/// Numbers may arrive as JSON numbers or, for istanbul's empty totals, as
/// the string `"Unknown"`.
fn number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn count(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 * 100.0 / total as f64
    }
}
