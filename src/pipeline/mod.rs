pub mod commands;
pub mod orchestrator;
pub mod report;
mod types;

pub use commands::{PLAYWRIGHT_REPORT, build_plan};
pub use orchestrator::run_pipeline;
pub use report::{MAX_OUTPUT_CHARS, truncate_output};
pub use types::{
    FailureMode, HardFailure, Plan, RunOutcome, Skip, SoftFailure, Step, StepKind, StepResult,
    describe_exit,
};
