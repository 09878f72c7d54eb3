// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Parser for the human-readable output of `go test`
//!
//! Lines are classified one at a time by [`classify`]. The only state kept
//! across lines is whether a data race report is in progress: its body is
//! passed through as output verbatim.
//!
//! # Example
//!
//! ```
//! use gotest_report::event::{Event, Outcome};
//! use gotest_report::gotest::GoTestParser;
//! use gotest_report::parser::EventParser;
//!
//! let mut parser = GoTestParser::new();
//! let events = parser.process_line("=== RUN   TestA");
//! assert_eq!(events, vec![Event::RunStarted { name: "TestA".to_string() }]);
//! ```

use tracing::debug;

use crate::classify::{Line, classify};
use crate::event::{Event, Outcome};
use crate::parser::EventParser;

/// Separator printed before and after each race detector report
const RACE_SEPARATOR: &str = "==================";

/// Streaming parser for `go test` text output
#[derive(Debug, Clone, Default)]
pub struct GoTestParser {
    in_race_report: bool,
}

impl GoTestParser {
    /// Create a new parser
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventParser for GoTestParser {
    fn process_line(&mut self, line: &str) -> Vec<Event> {
        if self.in_race_report {
            if line.trim() == RACE_SEPARATOR {
                self.in_race_report = false;
            }
            return vec![Event::output(line)];
        }
        events_for_line(line, &mut self.in_race_report)
    }
}

fn events_for_line(line: &str, in_race_report: &mut bool) -> Vec<Event> {
    match classify(line) {
        Line::Run(name) => vec![Event::RunStarted {
            name: name.to_string(),
        }],
        Line::Pause(name) => vec![Event::Pause {
            name: name.to_string(),
        }],
        Line::Cont(name) => vec![Event::Continue {
            name: name.to_string(),
        }],
        Line::EndTest {
            prefix,
            indent,
            outcome,
            name,
            duration,
        } => {
            let mut events = Vec::with_capacity(2);
            if !prefix.is_empty() {
                events.push(Event::output(prefix));
            }
            events.push(Event::Result {
                name: name.to_string(),
                outcome,
                duration,
                indent,
            });
            events
        }
        Line::Status(outcome) => vec![Event::Status { outcome }],
        Line::Summary {
            result,
            package,
            elapsed,
            cached,
            message,
            coverage,
        } => vec![summary_event(result, package, elapsed, cached, message, coverage)],
        Line::Coverage { percent, packages } => vec![Event::Coverage {
            percent,
            packages: packages.into_iter().map(str::to_string).collect(),
        }],
        Line::Metadata { key, value } => vec![Event::Metadata {
            key: key.to_string(),
            value: value.to_string(),
        }],
        Line::Benchmark {
            name,
            iterations,
            ns_per_op,
            mb_per_sec,
            bytes_per_op,
            allocs_per_op,
        } => vec![Event::BenchmarkResult {
            name: name.to_string(),
            iterations,
            ns_per_op,
            mb_per_sec,
            bytes_per_op,
            allocs_per_op,
        }],
        Line::EndBenchmark { name, outcome } => vec![Event::BenchmarkEnd {
            name: name.to_string(),
            outcome,
        }],
        Line::BuildHeader(package) => vec![Event::BuildOutput {
            package: package.to_string(),
        }],
        Line::DataRace => {
            *in_race_report = true;
            vec![Event::DataRace { test: None }, Event::output(line)]
        }
        Line::Output(line) => vec![Event::output(line)],
    }
}

/// Map a package summary line onto the matching event
pub(crate) fn summary_event(
    result: &str,
    package: &str,
    elapsed: Option<std::time::Duration>,
    cached: bool,
    message: Option<&str>,
    coverage: Option<f64>,
) -> Event {
    match message {
        Some(cause @ ("[build failed]" | "[setup failed]")) => Event::BuildFailure {
            package: package.to_string(),
            cause: cause.to_string(),
            elapsed,
        },
        Some("[no test files]" | "[no tests to run]") => Event::NoTestFiles {
            package: package.to_string(),
            elapsed,
        },
        _ if result == "?" => Event::NoTestFiles {
            package: package.to_string(),
            elapsed,
        },
        other => {
            if let Some(other) = other {
                debug!(package, message = other, "unrecognized summary status message");
            }
            Event::PackageResult {
                package: package.to_string(),
                outcome: Outcome::from_status(result),
                elapsed,
                cached,
                coverage,
            }
        }
    }
}
