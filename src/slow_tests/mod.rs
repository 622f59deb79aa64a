//! Slow-test detection from test-runner output (vitest, jest, pytest and
//! bracketed `[1 s]` layouts).

mod parse;

pub use parse::parse_durations;

use std::fmt::Write as _;

/// How long a single test took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDuration {
    pub name: String,
    pub millis: u64,
}

/// Tests at or above `min_ms`, slowest first, at most `limit` of them.
pub fn slowest(mut durations: Vec<TestDuration>, min_ms: u64, limit: usize) -> Vec<TestDuration> {
    durations.retain(|d| d.millis >= min_ms);
    durations.sort_by(|a, b| b.millis.cmp(&a.millis).then_with(|| a.name.cmp(&b.name)));
    durations.truncate(limit);
    durations
}

/// Human-readable report, or `None` when no test was slow.
pub fn render(output: &str, min_ms: u64, limit: usize) -> Option<String> {
    let slow = slowest(parse_durations(output), min_ms, limit);
    if slow.is_empty() {
        return None;
    }
    let mut report = format!("Slow tests (>= {min_ms} ms):\n");
    for test in &slow {
        let _ = writeln!(
            report,
            "  {:>8.2}s  {}",
            test.millis as f64 / 1000.0,
            test.name
        );
    }
    Some(report)
}
