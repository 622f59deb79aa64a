use std::path::PathBuf;

use serde::Serialize;

/// One coverage metric as reported by the test tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metric {
    pub pct: f64,
    pub covered: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub lines: Metric,
    pub statements: Metric,
    pub branches: Metric,
    pub functions: Metric,
}

impl CoverageSummary {
    /// Metrics in display order, with their names.
    pub fn metrics(&self) -> [(&'static str, Metric); 4] {
        [
            ("lines", self.lines),
            ("statements", self.statements),
            ("branches", self.branches),
            ("functions", self.functions),
        ]
    }
}

/// On-disk layout of a coverage summary artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageFormat {
    /// istanbul `json-summary` (vitest, jest, c8).
    Istanbul,
    /// coverage.py `json` report (pytest-cov).
    CoveragePy,
}

/// Result of the line-coverage gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateStatus {
    /// No step that produces coverage ran.
    NotRun,
    /// No usable summary artifact was found.
    Skipped,
    Passed {
        pct: f64,
        threshold: f64,
        source: PathBuf,
    },
    Failed {
        pct: f64,
        threshold: f64,
        source: PathBuf,
    },
}
