//! End-to-end runs against scratch projects.
//!
//! Tool commands are swapped for `sh` scripts so the tests need no Node or
//! Python toolchain.

#![cfg(unix)]

use std::fs;
use std::path::Path;

use buildgate::config::{Config, Ecosystem};
use buildgate::coverage::GateStatus;
use buildgate::pipeline::{HardFailure, Plan, RunOutcome, StepKind, build_plan, run_pipeline};
use buildgate::process::CommandSpec;
use buildgate::project::{TestTool, detect};

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh", ["-c", script])
}

fn node_project(dir: &Path) {
    fs::write(
        dir.join("package.json"),
        r#"{
  "name": "demo",
  "scripts": { "test": "vitest" },
  "devDependencies": { "vitest": "^2.0.0", "typescript": "^5.0.0" }
}"#,
    )
    .unwrap();
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/index.ts"), "export const x = 1;\n").unwrap();
}

fn coverage_script(pct: f64) -> String {
    format!(
        r#"mkdir -p coverage && printf '%s' '{{"total":{{"lines":{{"total":200,"covered":145,"pct":{pct}}},"statements":{{"total":210,"covered":150,"pct":71.43}},"branches":{{"total":40,"covered":20,"pct":50}},"functions":{{"total":30,"covered":25,"pct":83.33}}}}}}' > coverage/coverage-summary.json"#
    )
}

/// Keep only the test step and point it at `script`.
fn test_step_only(plan: &mut Plan, script: &str) {
    plan.steps.retain(|s| s.kind == StepKind::Test);
    assert_eq!(plan.steps.len(), 1, "expected a test step");
    plan.steps[0].command = sh(script);
    plan.steps[0].diagnostic = None;
    plan.skipped.clear();
}

fn run(cfg: &Config, plan: &Plan) -> (RunOutcome, String) {
    let shape = detect(cfg);
    let mut out = Vec::new();
    let outcome = run_pipeline(cfg, &shape, plan, &mut out).unwrap();
    (outcome, String::from_utf8(out).unwrap())
}

#[test]
fn vitest_project_passes_gate_at_72_5() {
    let dir = tempfile::tempdir().unwrap();
    node_project(dir.path());

    let cfg = Config::for_root(dir.path());
    let shape = detect(&cfg);
    assert_eq!(shape.ecosystem, Ecosystem::Node);
    assert_eq!(shape.test_tool, TestTool::Vitest);

    let mut plan = build_plan(&cfg, &shape);
    test_step_only(&mut plan, &coverage_script(72.5));

    let (outcome, text) = run(&cfg, &plan);
    assert_eq!(outcome.exit_code(), 0, "{text}");
    assert!(matches!(outcome.gate, GateStatus::Passed { .. }));

    let row = text
        .lines()
        .find(|l| l.trim_start().starts_with("lines"))
        .unwrap();
    assert!(row.contains("72.50%"), "{row}");
    assert!(row.contains("OK"), "{row}");
    assert!(text.contains("--- coverage analytics ---"));
    assert!(text.contains("All steps OK"));
}

#[test]
fn coverage_one_point_below_threshold_fails() {
    let dir = tempfile::tempdir().unwrap();
    node_project(dir.path());

    let cfg = Config::for_root(dir.path());
    let mut plan = build_plan(&cfg, &detect(&cfg));
    test_step_only(&mut plan, &coverage_script(69.0));

    let (outcome, text) = run(&cfg, &plan);
    assert_eq!(outcome.exit_code(), 1);
    match outcome.hard_failure {
        Some(HardFailure::CoverageBelowThreshold {
            actual, required, ..
        }) => {
            assert_eq!(actual, 69.0);
            assert_eq!(required, 70.0);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(text.contains("69.00%"));
    assert!(text.contains("70.00%"));
    assert!(text.contains("coverage/coverage-summary.json"));
    assert!(!text.contains("Summary:"));
}

#[test]
fn threshold_is_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    node_project(dir.path());

    let cfg = Config::for_root(dir.path());
    let mut plan = build_plan(&cfg, &detect(&cfg));
    test_step_only(&mut plan, &coverage_script(70.0));

    let (outcome, _) = run(&cfg, &plan);
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn hard_failure_skips_later_steps_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    node_project(dir.path());

    let cfg = Config::for_root(dir.path());
    let mut plan = build_plan(&cfg, &detect(&cfg));
    for step in &mut plan.steps {
        step.diagnostic = None;
        step.command = match step.kind {
            StepKind::Format => sh("echo 'src/index.ts' ; exit 1"),
            _ => sh("touch ran-after-format"),
        };
    }

    let (outcome, text) = run(&cfg, &plan);
    assert_eq!(outcome.exit_code(), 1);
    assert!(text.contains("FAIL format (exit 1)"));
    assert!(!text.contains("Summary:"));
    assert!(!text.contains("coverage gate"));
    // toolchain ran before format; nothing after it did
    assert_eq!(outcome.executed, vec!["toolchain", "format"]);
}

#[test]
fn soft_failures_keep_exit_code_zero() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    node_project(root);
    fs::write(root.join("eslint.config.js"), "export default [];\n").unwrap();

    let cfg = Config::for_root(root);
    let mut plan = build_plan(&cfg, &detect(&cfg));
    for step in &mut plan.steps {
        step.diagnostic = None;
        step.command = match step.kind {
            StepKind::Lint => sh("echo '1 problem' ; exit 1"),
            StepKind::Test => sh(&coverage_script(80.0)),
            _ => sh("exit 0"),
        };
    }

    let (outcome, text) = run(&cfg, &plan);
    assert_eq!(outcome.exit_code(), 0, "{text}");
    assert_eq!(outcome.soft_failures.len(), 1);
    assert!(text.contains("WARN (continuing) lint (exit 1)"));
    assert!(text.contains("Completed with 1 warning(s):"));
    assert!(text.contains("  - lint (exit 1)"));
}

#[test]
fn long_failure_output_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::for_root(dir.path());
    let mut plan = Plan::default();
    plan.steps.push(buildgate::pipeline::Step::new(
        "lint",
        StepKind::Lint,
        sh("head -c 8001 /dev/zero | tr '\\0' 'a'; exit 1"),
        buildgate::pipeline::FailureMode::Soft,
    ));

    let (_, text) = run(&cfg, &plan);
    assert!(text.contains(&format!("{}\n... [truncated, 1 more characters]", "a".repeat(8000))));
}

#[test]
fn output_ending_in_newline_is_truncated_at_budget() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::for_root(dir.path());
    let mut plan = Plan::default();
    plan.steps.push(buildgate::pipeline::Step::new(
        "lint",
        StepKind::Lint,
        sh("head -c 8000 /dev/zero | tr '\\0' 'a'; echo; exit 1"),
        buildgate::pipeline::FailureMode::Soft,
    ));

    let (_, text) = run(&cfg, &plan);
    assert!(text.contains(&format!("{}\n... [truncated, 1 more characters]", "a".repeat(8000))));
}

#[test]
fn stale_summary_from_previous_run_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    node_project(dir.path());
    fs::create_dir_all(dir.path().join("coverage")).unwrap();
    fs::write(
        dir.path().join("coverage/coverage-summary.json"),
        r#"{"total":{"lines":{"total":10,"covered":9,"pct":90}}}"#,
    )
    .unwrap();

    let cfg = Config::for_root(dir.path());
    let mut plan = build_plan(&cfg, &detect(&cfg));
    test_step_only(&mut plan, "exit 0");

    let (outcome, text) = run(&cfg, &plan);
    assert_eq!(outcome.gate, GateStatus::Skipped);
    assert!(text.contains("no coverage summary found"));
}

#[test]
fn python_project_plan() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(
        root.join("pyproject.toml"),
        "[project]\nname = \"demo\"\n\n[tool.ruff]\nline-length = 100\n\n[tool.mypy]\nstrict = true\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("src/demo")).unwrap();
    fs::create_dir_all(root.join("tests")).unwrap();

    let cfg = Config::for_root(root);
    let shape = detect(&cfg);
    assert_eq!(shape.ecosystem, Ecosystem::Python);
    assert_eq!(shape.test_tool, TestTool::Pytest);

    let plan = build_plan(&cfg, &shape);
    let names: Vec<_> = plan.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "toolchain",
            "toolchain:ruff",
            "toolchain:mypy",
            "toolchain:pytest",
            "sync",
            "format",
            "lint",
            "typecheck",
            "security",
            "test"
        ]
    );

    let test = plan.steps.last().unwrap();
    assert!(test.produces_coverage);
    assert!(
        test.command
            .args
            .iter()
            .any(|a| a == "--cov-report=json:coverage.json")
    );
}
