use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use crate::artifacts;
use crate::config::Config;
use crate::coverage::{self, GateStatus};
use crate::process::{self, ProcessOutput};
use crate::project::ProjectShape;
use crate::slow_tests;
use crate::style;

use super::commands::PLAYWRIGHT_REPORT;
use super::report::{write_diagnostic, write_failure, write_summary};
use super::types::{
    FailureMode, HardFailure, Plan, RunOutcome, SoftFailure, Step, StepKind, StepResult,
};

/// Run the plan's steps in order, one at a time.
///
/// A hard failure returns at once: no later step, no coverage gate and no
/// summary. Soft failures are collected and the run continues. Once every
/// step has run, the coverage gate is applied (only if a coverage-producing
/// step ran), reports are collected and the summary is printed.
///
/// Coverage summaries and the browser-test report are deleted before the
/// step that writes them, so leftovers from an earlier run are never read.
pub fn run_pipeline<W: Write>(
    config: &Config,
    shape: &ProjectShape,
    plan: &Plan,
    out: &mut W,
) -> io::Result<RunOutcome> {
    let started = Instant::now();
    let color = config.color;

    let mut outcome = RunOutcome {
        executed: Vec::new(),
        soft_failures: Vec::new(),
        hard_failure: None,
        gate: GateStatus::NotRun,
    };

    for skip in &plan.skipped {
        writeln!(out, "{} {}: {}", style::skip(color), skip.name, skip.reason)?;
    }

    let mut coverage_ran = false;
    let mut e2e_ran = false;

    for step in &plan.steps {
        if step.produces_coverage {
            coverage::remove_stale(&config.root, shape.ecosystem);
        }
        if step.kind == StepKind::EndToEnd {
            remove_stale_report(&config.root.join(PLAYWRIGHT_REPORT));
            e2e_ran = true;
        }

        tracing::debug!(step = %step.name, command = %step.command.display(), "starting step");
        let result = run_step(step, config);
        outcome.executed.push(step.name.clone());

        if result.passed() {
            writeln!(out, "{} {}", style::ok(color), step.name)?;
            if step.reports_slow_tests {
                let combined = format!("{}\n{}", result.stdout, result.stderr);
                if let Some(report) =
                    slow_tests::render(&combined, config.slow_test_ms, config.slow_test_limit)
                {
                    write!(out, "{report}")?;
                }
            }
            coverage_ran |= step.produces_coverage;
            continue;
        }

        tracing::debug!(step = %step.name, exit_code = ?result.exit_code, "step failed");
        write_failure(out, step, &result, &config.root, color)?;
        if let Some(diagnostic) = &step.diagnostic {
            let output = process::run(diagnostic, &config.root);
            write_diagnostic(out, diagnostic, &output)?;
        }

        match step.failure_mode {
            FailureMode::Hard => {
                outcome.hard_failure = Some(HardFailure::StepFailed {
                    step: step.name.clone(),
                    exit_code: result.exit_code,
                });
                return Ok(outcome);
            }
            FailureMode::Soft => {
                outcome.soft_failures.push(SoftFailure {
                    step: step.name.clone(),
                    exit_code: result.exit_code,
                });
            }
        }
    }

    if coverage_ran {
        outcome.gate = coverage::run_gate(config, shape, out)?;
        if let GateStatus::Failed {
            pct,
            threshold,
            source,
        } = &outcome.gate
        {
            outcome.hard_failure = Some(HardFailure::CoverageBelowThreshold {
                actual: *pct,
                required: *threshold,
                source: source.clone(),
            });
            return Ok(outcome);
        }
    }

    artifacts::collect_reports(config, e2e_ran, out)?;
    write_summary(
        out,
        outcome.executed.len(),
        &outcome.soft_failures,
        started.elapsed(),
        color,
    )?;
    Ok(outcome)
}

fn remove_stale_report(path: &Path) {
    if !path.is_file() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "could not remove stale report");
    }
}

fn run_step(step: &Step, config: &Config) -> StepResult {
    let ProcessOutput {
        exit_code,
        stdout,
        mut stderr,
        spawn_error,
    } = process::run(&step.command, &config.root);

    if let Some(err) = spawn_error {
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&err);
    }

    StepResult {
        name: step.name.clone(),
        exit_code,
        stdout,
        stderr,
    }
}
