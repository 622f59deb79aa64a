use std::sync::LazyLock;

use regex::Regex;

use super::TestDuration;

/// Recognised duration layouts. Each pattern captures `name`, `value` and
/// optionally `unit` (`ms` when absent).
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // vitest / jest verbose: `✓ suite > case 1234ms` or `✓ case (1234 ms)`
        r"^\s*(?:✓|✔|√|×|✗|✕)\s+(?P<name>.+?)\s+\(?(?P<value>\d+(?:\.\d+)?)\s*(?P<unit>ms|s)\)?\s*$",
        // pytest --durations: `1.23s call     tests/test_x.py::test_y`
        r"^\s*(?P<value>\d+(?:\.\d+)?)(?P<unit>s)\s+(?:call|setup|teardown)\s+(?P<name>\S+)\s*$",
        // bracketed: `Passed Suite.Case [1 s]` / `Failed Suite.Case [250 ms]`
        r"^\s*(?:Passed|Failed)\s+(?P<name>.+?)\s+\[(?:< ?)?(?P<value>\d+(?:\.\d+)?)\s*(?P<unit>ms|s)\]\s*$",
    ]
    .into_iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extract per-test durations from raw test-runner output.
///
/// Lines that match none of the known layouts are ignored.
pub fn parse_durations(output: &str) -> Vec<TestDuration> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TestDuration> {
    PATTERNS.iter().find_map(|re| {
        let caps = re.captures(line)?;
        let value: f64 = caps.name("value")?.as_str().parse().ok()?;
        let millis = match caps.name("unit").map(|m| m.as_str()) {
            Some("s") => value * 1000.0,
            _ => value,
        };
        Some(TestDuration {
            name: caps.name("name")?.as_str().trim().to_string(),
            millis: millis.round() as u64,
        })
    })
}
