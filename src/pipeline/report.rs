use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::process::{CommandSpec, ProcessOutput};
use crate::style;

use super::types::{FailureMode, SoftFailure, Step, StepResult, describe_exit};

/// Per-stream budget for failure output.
pub const MAX_OUTPUT_CHARS: usize = 8000;

/// Keep the first `max` characters of `text`, noting how many were cut.
pub fn truncate_output(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let remaining = text[byte_idx..].chars().count();
            format!(
                "{}\n... [truncated, {remaining} more characters]",
                &text[..byte_idx]
            )
        }
    }
}

/// Report a failed step: label, exit code, command line, working directory
/// (when not the project root) and both output streams.
pub fn write_failure<W: Write>(
    out: &mut W,
    step: &Step,
    result: &StepResult,
    root: &Path,
    color: bool,
) -> io::Result<()> {
    let label = match step.failure_mode {
        FailureMode::Hard => style::fail(color),
        FailureMode::Soft => style::soft_fail(color),
    };
    writeln!(
        out,
        "{label} {} ({})",
        step.name,
        describe_exit(result.exit_code)
    )?;
    writeln!(out, "  command: {}", step.command.display())?;
    if let Some(cwd) = &step.command.cwd
        && cwd != root
    {
        writeln!(out, "  cwd: {}", cwd.display())?;
    }
    write_stream(out, "stdout", &result.stdout)?;
    write_stream(out, "stderr", &result.stderr)?;
    Ok(())
}

/// Print the output of a diagnostic re-run. A diagnostic that could not be
/// started shows as `(no output)`.
pub fn write_diagnostic<W: Write>(
    out: &mut W,
    command: &CommandSpec,
    output: &ProcessOutput,
) -> io::Result<()> {
    writeln!(out, "--- diagnostic: {} ---", command.display())?;
    let text = output.streams();
    if text.trim().is_empty() {
        writeln!(out, "(no output)")
    } else {
        writeln!(out, "{}", truncate_output(&text, MAX_OUTPUT_CHARS).trim_end())
    }
}

fn write_stream<W: Write>(out: &mut W, name: &str, text: &str) -> io::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    writeln!(out, "--- {name} ---")?;
    writeln!(out, "{}", truncate_output(text, MAX_OUTPUT_CHARS).trim_end())
}

/// Final summary, printed only when no hard failure occurred.
pub fn write_summary<W: Write>(
    out: &mut W,
    executed: usize,
    soft_failures: &[SoftFailure],
    elapsed: Duration,
    color: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Summary: {executed} step(s) run in {:.2}s",
        elapsed.as_secs_f64()
    )?;
    if soft_failures.is_empty() {
        writeln!(out, "{} All steps OK", style::ok(color))
    } else {
        writeln!(
            out,
            "{} Completed with {} warning(s):",
            style::warn(color),
            soft_failures.len()
        )?;
        for failure in soft_failures {
            writeln!(
                out,
                "  - {} ({})",
                failure.step,
                describe_exit(failure.exit_code)
            )?;
        }
        Ok(())
    }
}
