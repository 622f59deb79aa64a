use std::path::PathBuf;

use crate::coverage::GateStatus;
use crate::process::CommandSpec;

/// How a failing step affects the run. Fixed when the step is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Abort the run with a non-zero exit code.
    Hard,
    /// Record, report and continue.
    Soft,
}

/// Identifies what a step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Toolchain,
    Sync,
    Format,
    Lint,
    TypeCheck,
    Security,
    Test,
    EndToEnd,
}

/// A single pipeline step: one external command plus how to treat failure.
#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub kind: StepKind,
    pub command: CommandSpec,
    pub failure_mode: FailureMode,
    /// Re-run on failure to enrich the report. Its outcome is ignored.
    pub diagnostic: Option<CommandSpec>,
    pub produces_coverage: bool,
    pub reports_slow_tests: bool,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        kind: StepKind,
        command: CommandSpec,
        failure_mode: FailureMode,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            command,
            failure_mode,
            diagnostic: None,
            produces_coverage: false,
            reports_slow_tests: false,
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: CommandSpec) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    pub fn with_coverage(mut self) -> Self {
        self.produces_coverage = true;
        self
    }

    pub fn with_slow_test_report(mut self) -> Self {
        self.reports_slow_tests = true;
        self
    }
}

/// A step that was not built because its prerequisite is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub name: String,
    pub reason: String,
}

impl Skip {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Steps to run in order, plus the ones that were left out and why.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub steps: Vec<Step>,
    pub skipped: Vec<Skip>,
}

/// Captured outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub name: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepResult {
    pub fn passed(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    pub step: String,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HardFailure {
    StepFailed {
        step: String,
        exit_code: Option<i32>,
    },
    CoverageBelowThreshold {
        actual: f64,
        required: f64,
        source: PathBuf,
    },
}

/// Everything the run produced that matters after it ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Names of the steps that were started, in order.
    pub executed: Vec<String>,
    pub soft_failures: Vec<SoftFailure>,
    pub hard_failure: Option<HardFailure>,
    pub gate: GateStatus,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.hard_failure.is_none()
    }

    /// 0 when nothing hard-failed, 1 otherwise. Soft failures never count.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() { 0 } else { 1 }
    }
}

/// Render an exit code for humans; `None` means the process never ran or
/// was killed by a signal.
pub fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit {c}"),
        None => "did not run to completion".to_string(),
    }
}
