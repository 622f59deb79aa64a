use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::parse::{candidates, load, locate};
use super::types::{CoverageSummary, GateStatus};
use crate::config::Config;
use crate::project::ProjectShape;
use crate::style;

pub const ANALYTICS_BEGIN: &str = "--- coverage analytics ---";
pub const ANALYTICS_END: &str = "--- end coverage analytics ---";

/// Line coverage passes when it reaches the threshold.
pub fn check_gate(pct: f64, threshold: f64) -> bool {
    pct >= threshold
}

/// Locate the coverage summary, print it and apply the line-coverage gate.
///
/// A missing or unreadable summary is reported and skipped, never failed.
pub fn run_gate<W: Write>(
    config: &Config,
    shape: &ProjectShape,
    out: &mut W,
) -> io::Result<GateStatus> {
    let color = config.color;

    let Some((path, format)) = locate(&config.root, shape.ecosystem) else {
        writeln!(
            out,
            "{} coverage gate: no coverage summary found (looked for {}), skipping threshold check",
            style::warn(color),
            candidates(shape.ecosystem).join(", ")
        )?;
        return Ok(GateStatus::Skipped);
    };

    let summary = match load(&path, format) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unusable coverage summary");
            writeln!(
                out,
                "{} coverage gate: {e:#}, skipping threshold check",
                style::warn(color)
            )?;
            return Ok(GateStatus::Skipped);
        }
    };

    let source = display_path(&config.root, &path);
    write!(out, "{}", render_table(&summary, config.threshold, &source, color))?;
    writeln!(
        out,
        "{}",
        analytics_block(
            &summary,
            config.threshold,
            &source,
            shape.test_tool.as_str(),
            Utc::now()
        )
    )?;

    let pct = summary.lines.pct;
    if check_gate(pct, config.threshold) {
        writeln!(
            out,
            "{} coverage gate: lines {pct:.2}% meets the required {:.2}%",
            style::ok(color),
            config.threshold
        )?;
        Ok(GateStatus::Passed {
            pct,
            threshold: config.threshold,
            source: path,
        })
    } else {
        writeln!(
            out,
            "{} coverage gate: lines {pct:.2}% is below the required {:.2}% (source: {source})",
            style::fail(color),
            config.threshold
        )?;
        Ok(GateStatus::Failed {
            pct,
            threshold: config.threshold,
            source: path,
        })
    }
}

/// Four-row table. The per-metric marker is informational; only lines gate.
pub fn render_table(
    summary: &CoverageSummary,
    threshold: f64,
    source: &str,
    color: bool,
) -> String {
    let mut table = format!("Coverage ({source}, threshold {threshold:.2}%)\n");
    for (name, metric) in summary.metrics() {
        let marker = if metric.pct >= threshold {
            style::ok(color)
        } else {
            style::warn(color)
        };
        table.push_str(&format!(
            "  {name:<11}{:>7.2}%  {marker}  ({}/{})\n",
            metric.pct, metric.covered, metric.total
        ));
    }
    table
}

#[derive(Serialize)]
struct Analytics<'a> {
    timestamp: String,
    threshold: f64,
    source: &'a str,
    tool: &'a str,
    metrics: &'a CoverageSummary,
}

/// Machine-readable coverage record for CI, framed by marker lines.
pub fn analytics_block(
    summary: &CoverageSummary,
    threshold: f64,
    source: &str,
    tool: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let record = Analytics {
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        threshold,
        source,
        tool,
        metrics: summary,
    };
    let body = serde_json::to_string_pretty(&record).unwrap_or_else(|_| "{}".to_string());
    format!("{ANALYTICS_BEGIN}\n{body}\n{ANALYTICS_END}")
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
