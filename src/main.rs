use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use buildgate::config::{self, Config, Ecosystem, Overrides, THRESHOLD_ENV};
use buildgate::{artifacts, pipeline, project, style, telemetry};

/// Run format, lint, type-check and test steps for a Node or Python
/// project, then gate on line coverage.
#[derive(Parser, Debug)]
#[command(name = "buildgate", version, long_about = None)]
struct Cli {
    /// Minimum line coverage percentage (COVERAGE_THRESHOLD wins if set)
    #[arg(long, value_name = "PCT")]
    threshold: Option<f64>,

    /// Single source directory to check instead of the defaults
    #[arg(long, value_name = "DIR")]
    src: Option<String>,

    /// Project root
    #[arg(long, value_name = "PATH", default_value = ".")]
    root: PathBuf,

    /// Extra source directories, comma separated
    #[arg(long, value_name = "LIST")]
    include_dirs: Option<String>,

    /// Source directories to leave out, comma separated
    #[arg(long, value_name = "LIST")]
    exclude_dirs: Option<String>,

    /// Also run the browser end-to-end suite when it is configured
    #[arg(long)]
    run_playwright_tests: bool,

    /// Skip detection and treat the project as this ecosystem
    #[arg(long, value_enum)]
    ecosystem: Option<Ecosystem>,

    /// Let the formatter and linter rewrite files
    #[arg(long)]
    fix: bool,

    /// Remove build and test artifacts, then exit
    #[arg(long)]
    clean: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Never colour the output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    telemetry::init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            eprintln!("{} {e:#}", style::fail(io::stderr().is_terminal()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let color = !cli.no_color
        && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
        && io::stdout().is_terminal();

    let file = config::load(&cli.root)?;
    let env_threshold = std::env::var(THRESHOLD_ENV).ok();
    let overrides = Overrides {
        root: cli.root,
        threshold: cli.threshold,
        src_dir: cli.src,
        include_dirs: dir_list(cli.include_dirs.as_deref()),
        exclude_dirs: dir_list(cli.exclude_dirs.as_deref()),
        run_playwright_tests: cli.run_playwright_tests,
        ecosystem: cli.ecosystem,
        fix: cli.fix,
        verbose: cli.verbose,
        color,
    };
    let config = Config::resolve(overrides, file, env_threshold.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.clean {
        let ecosystem = config
            .ecosystem
            .unwrap_or_else(|| project::detect_ecosystem(&config.root));
        let removed = artifacts::clean(&config.root, ecosystem)?;
        for path in &removed {
            writeln!(out, "removed {}", path.display())?;
        }
        writeln!(
            out,
            "{} cleaned {} artifact(s)",
            style::ok(config.color),
            removed.len()
        )?;
        return Ok(ExitCode::SUCCESS);
    }

    let shape = project::detect(&config);
    let plan = pipeline::build_plan(&config, &shape);
    let outcome = pipeline::run_pipeline(&config, &shape, &plan, &mut out)
        .context("failed to write the report")?;
    out.flush()?;

    Ok(if outcome.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn dir_list(raw: Option<&str>) -> Vec<String> {
    raw.map(config::parse_dir_list).unwrap_or_default()
}
