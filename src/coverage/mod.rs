//! Coverage summary discovery, parsing and the line-coverage gate.

mod gate;
mod parse;
mod types;

pub use gate::{ANALYTICS_BEGIN, ANALYTICS_END, analytics_block, check_gate, render_table, run_gate};
pub use parse::{candidates, load, locate, parse, remove_stale};
pub use types::{CoverageFormat, CoverageSummary, GateStatus, Metric};
