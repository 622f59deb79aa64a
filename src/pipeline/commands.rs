use crate::config::{Config, Ecosystem};
use crate::process::CommandSpec;
use crate::project::{ProjectShape, TestTool};

use super::types::{FailureMode, Plan, Skip, Step, StepKind};

/// Browser-test JSON report location, relative to the project root.
pub const PLAYWRIGHT_REPORT: &str = "test-results/playwright-results.json";

/// Build the ordered step list for a detected project.
///
/// Steps whose prerequisite is missing (no config file, no source
/// directories, no test runner) are left out and recorded as [`Skip`]s.
pub fn build_plan(config: &Config, shape: &ProjectShape) -> Plan {
    match shape.ecosystem {
        Ecosystem::Node => node_plan(config, shape),
        Ecosystem::Python => python_plan(config, shape),
    }
}

// ── Node ──────────────────────────────────────────────────────────────

fn node_plan(config: &Config, shape: &ProjectShape) -> Plan {
    let mut plan = Plan::default();
    let runner = &shape.package_runner;
    let dirs = &shape.source_dirs;

    plan.steps.push(Step::new(
        "toolchain",
        StepKind::Toolchain,
        CommandSpec::new("node", ["--version"]),
        FailureMode::Hard,
    ));

    if dirs.is_empty() {
        plan.skipped.push(Skip::new("format", "no eligible source directories"));
    } else {
        let mode = if config.fix { "--write" } else { "--check" };
        plan.steps.push(
            Step::new(
                "format",
                StepKind::Format,
                tool(runner, ["prettier", mode], dirs),
                FailureMode::Hard,
            )
            .with_diagnostic(tool(runner, ["prettier", "--list-different"], dirs)),
        );
    }

    if !shape.has_lint_config() {
        plan.skipped.push(Skip::new("lint", "no ESLint configuration found"));
    } else if dirs.is_empty() {
        plan.skipped.push(Skip::new("lint", "no eligible source directories"));
    } else {
        let mut lint = tool(runner, ["eslint"], dirs);
        if config.fix {
            lint = lint.with_args(["--fix"]);
        }
        plan.steps.push(
            Step::new("lint", StepKind::Lint, lint, FailureMode::Soft)
                .with_diagnostic(tool(runner, ["eslint", "--format", "json"], dirs)),
        );
    }

    if shape.has_type_config() {
        let tsc = tool(runner, ["tsc", "--noEmit"], &[]);
        let diag = tsc.with_args(["--extendedDiagnostics"]);
        plan.steps.push(
            Step::new("typecheck", StepKind::TypeCheck, tsc, FailureMode::Hard)
                .with_diagnostic(diag),
        );
    } else {
        plan.skipped.push(Skip::new("typecheck", "no tsconfig.json found"));
    }

    match node_test_step(runner, shape.test_tool) {
        Some(step) => plan.steps.push(step),
        None => plan.skipped.push(Skip::new("test", "no test runner declared in package.json")),
    }

    if !config.run_playwright_tests {
        plan.skipped.push(Skip::new("e2e", "not requested (--run-playwright-tests)"));
    } else if !shape.has_playwright {
        plan.skipped.push(Skip::new("e2e", "playwright is not installed"));
    } else {
        let e2e = tool(runner, ["playwright", "test", "--reporter=json"], &[])
            .with_env("PLAYWRIGHT_JSON_OUTPUT_NAME", PLAYWRIGHT_REPORT);
        plan.steps.push(Step::new("e2e", StepKind::EndToEnd, e2e, FailureMode::Soft));
    }

    plan
}

fn node_test_step(runner: &[String], test_tool: TestTool) -> Option<Step> {
    let (command, diagnostic) = match test_tool {
        TestTool::Vitest => (
            tool(
                runner,
                [
                    "vitest",
                    "run",
                    "--coverage",
                    "--coverage.reporter=json-summary",
                    "--coverage.reporter=text",
                ],
                &[],
            ),
            Some(tool(runner, ["vitest", "run", "--reporter=verbose"], &[])),
        ),
        TestTool::Jest => (
            tool(
                runner,
                [
                    "jest",
                    "--coverage",
                    "--coverageReporters=json-summary",
                    "--coverageReporters=text",
                ],
                &[],
            ),
            Some(tool(runner, ["jest", "--verbose", "--runInBand"], &[])),
        ),
        TestTool::GenericWithCoverage => {
            let mut args = vec![
                "c8".to_string(),
                "--reporter=json-summary".to_string(),
                "--reporter=text".to_string(),
            ];
            args.extend(script_runner(runner).iter().map(|s| s.to_string()));
            args.push("test".to_string());
            (CommandSpec::launched(runner, args), None)
        }
        TestTool::None | TestTool::Pytest => return None,
    };

    let mut step = Step::new("test", StepKind::Test, command, FailureMode::Hard)
        .with_coverage()
        .with_slow_test_report();
    step.diagnostic = diagnostic;
    Some(step)
}

/// The package manager that runs `package.json` scripts for a launcher.
fn script_runner(runner: &[String]) -> &'static [&'static str] {
    match runner.first().map(String::as_str) {
        Some("pnpm") => &["pnpm"],
        Some("yarn") => &["yarn"],
        Some("bunx") | Some("bun") => &["bun", "run"],
        _ => &["npm"],
    }
}

// ── Python ────────────────────────────────────────────────────────────

fn python_plan(config: &Config, shape: &ProjectShape) -> Plan {
    let mut plan = Plan::default();
    let runner = &shape.package_runner;
    let dirs = &shape.source_dirs;
    let launcher = runner.first().cloned().unwrap_or_else(|| "python".to_string());

    plan.steps.push(Step::new(
        "toolchain",
        StepKind::Toolchain,
        CommandSpec::new(launcher.clone(), ["--version"]),
        FailureMode::Hard,
    ));

    // Every tool a later step launches through the runner must answer
    // `--version` before anything else runs.
    let mut required = Vec::new();
    if !dirs.is_empty() {
        required.push("ruff");
        if shape.has_type_config() {
            required.push("mypy");
        }
    }
    if shape.test_tool == TestTool::Pytest {
        required.push("pytest");
    }
    for name in required {
        plan.steps.push(Step::new(
            format!("toolchain:{name}"),
            StepKind::Toolchain,
            tool(runner, [name, "--version"], &[]),
            FailureMode::Hard,
        ));
    }

    if launcher == "uv" {
        plan.steps.push(Step::new(
            "sync",
            StepKind::Sync,
            CommandSpec::new("uv", ["sync"]),
            FailureMode::Hard,
        ));
    } else {
        plan.skipped.push(Skip::new("sync", "package runner is not uv"));
    }

    if dirs.is_empty() {
        plan.skipped.push(Skip::new("format", "no eligible source directories"));
    } else {
        let format = if config.fix {
            tool(runner, ["ruff", "format"], dirs)
        } else {
            tool(runner, ["ruff", "format", "--check"], dirs)
        };
        plan.steps.push(
            Step::new("format", StepKind::Format, format, FailureMode::Hard)
                .with_diagnostic(tool(runner, ["ruff", "format", "--diff"], dirs)),
        );
    }

    if !shape.has_lint_config() {
        plan.skipped.push(Skip::new("lint", "no ruff configuration found"));
    } else if dirs.is_empty() {
        plan.skipped.push(Skip::new("lint", "no eligible source directories"));
    } else {
        let mut lint = tool(runner, ["ruff", "check"], dirs);
        if config.fix {
            lint = lint.with_args(["--fix"]);
        }
        plan.steps.push(
            Step::new("lint", StepKind::Lint, lint, FailureMode::Soft).with_diagnostic(tool(
                runner,
                ["ruff", "check", "--output-format", "json"],
                dirs,
            )),
        );
    }

    if !shape.has_type_config() {
        plan.skipped.push(Skip::new("typecheck", "no mypy configuration found"));
    } else if dirs.is_empty() {
        plan.skipped.push(Skip::new("typecheck", "no eligible source directories"));
    } else {
        plan.steps.push(
            Step::new(
                "typecheck",
                StepKind::TypeCheck,
                tool(runner, ["mypy"], dirs),
                FailureMode::Hard,
            )
            .with_diagnostic(tool(
                runner,
                ["mypy", "--show-error-context", "--show-traceback"],
                dirs,
            )),
        );
    }

    if dirs.is_empty() {
        plan.skipped.push(Skip::new("security", "no eligible source directories"));
    } else {
        plan.steps.push(Step::new(
            "security",
            StepKind::Security,
            tool(runner, ["ruff", "check", "--select", "S"], dirs),
            FailureMode::Soft,
        ));
    }

    if shape.test_tool == TestTool::Pytest {
        let durations = format!("--durations={}", config.slow_test_limit.max(1));
        let pytest = tool(
            runner,
            [
                "pytest",
                "--cov=.",
                "--cov-report=term",
                "--cov-report=json:coverage.json",
                durations.as_str(),
            ],
            &[],
        );
        plan.steps.push(
            Step::new("test", StepKind::Test, pytest, FailureMode::Hard)
                .with_diagnostic(tool(runner, ["pytest", "-x", "-vv", "--no-cov", "--tb=long"], &[]))
                .with_coverage()
                .with_slow_test_report(),
        );
    } else {
        plan.skipped.push(Skip::new("test", "no tests directory or pytest configuration"));
    }

    plan
}

/// `<runner...> <args...> <dirs...>`
fn tool<const N: usize>(runner: &[String], args: [&str; N], dirs: &[String]) -> CommandSpec {
    let words = args
        .iter()
        .map(|s| s.to_string())
        .chain(dirs.iter().cloned());
    CommandSpec::launched(runner, words)
}
