// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Parser for `go test -json` output
//!
//! Each record already names its action, package and test, so lifecycle
//! events map one to one. `output` records are split into complete lines and
//! run through the text parser, which recovers what test2json only reports as
//! text (benchmark statistics, coverage, race reports, compiler headers).
//! Framing lines that merely repeat a record (`=== RUN`, `--- PASS`, the
//! package summary) are dropped.
//!
//! # Example
//!
//! ```
//! use gotest_report::event::Event;
//! use gotest_report::gojson::GoJsonParser;
//! use gotest_report::parser::EventParser;
//!
//! let mut parser = GoJsonParser::new();
//! let events = parser.process_line(r#"{"Action":"run","Package":"pkg","Test":"TestA"}"#);
//! assert_eq!(events, vec![Event::RunStarted { name: "TestA".to_string() }]);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{Event, Outcome};
use crate::gotest::GoTestParser;
use crate::parser::EventParser;

/// A single record emitted by `go test -json` (test2json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestRecord {
    /// Record time, RFC 3339
    #[serde(default)]
    pub time: Option<String>,
    /// `start`, `run`, `pause`, `cont`, `pass`, `fail`, `skip`, `output`,
    /// `bench`, `build-output`, `build-fail`
    pub action: String,
    /// Package import path
    #[serde(default)]
    pub package: Option<String>,
    /// Test name, absent for package-level records
    #[serde(default)]
    pub test: Option<String>,
    /// Elapsed seconds on terminal actions
    #[serde(default)]
    pub elapsed: Option<f64>,
    /// Output text, usually a single newline-terminated line
    #[serde(default)]
    pub output: Option<String>,
    /// Package whose build failure caused this package to fail
    #[serde(default)]
    pub failed_build: Option<String>,
    /// Package being built, on `build-output` records
    #[serde(default)]
    pub import_path: Option<String>,
}

/// Streaming parser for `go test -json` output
#[derive(Debug, Clone, Default)]
pub struct GoJsonParser {
    text: GoTestParser,
    partial: HashMap<Option<String>, String>,
    build_package: Option<String>,
    cached: bool,
}

impl GoJsonParser {
    /// Create a new parser
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn process_record(&mut self, record: TestRecord) -> Vec<Event> {
        let package = record.package.clone().unwrap_or_default();
        match (record.action.as_str(), record.test) {
            ("start", _) => vec![Event::PackageStart { package }],
            ("run", Some(name)) => vec![Event::RunStarted { name }],
            ("pause", Some(name)) => vec![Event::Pause { name }],
            ("cont", Some(name)) => vec![Event::Continue { name }],
            (action @ ("pass" | "fail" | "skip"), Some(name)) => {
                let mut events = self.flush_partial(Some(&name));
                events.push(Event::Result {
                    indent: name.matches('/').count(),
                    name,
                    outcome: Outcome::from_status(action),
                    duration: elapsed(record.elapsed),
                });
                events
            }
            ("skip", None) => {
                let mut events = self.flush_all();
                events.push(Event::NoTestFiles {
                    package,
                    elapsed: record.elapsed.map(|e| elapsed(Some(e))),
                });
                events
            }
            ("fail", None) if record.failed_build.is_some() => {
                let mut events = self.flush_all();
                events.push(Event::BuildFailure {
                    package,
                    cause: "[build failed]".to_string(),
                    elapsed: record.elapsed.map(|e| elapsed(Some(e))),
                });
                events
            }
            (action @ ("pass" | "fail"), None) => {
                let mut events = self.flush_all();
                events.push(Event::PackageResult {
                    package,
                    outcome: Outcome::from_status(action),
                    elapsed: record.elapsed.map(|e| elapsed(Some(e))),
                    cached: std::mem::take(&mut self.cached),
                    coverage: None,
                });
                events
            }
            ("output" | "bench", test) => {
                self.output(test, record.output.as_deref().unwrap_or_default())
            }
            ("build-output", _) => {
                let mut events = Vec::new();
                let import_path = record
                    .import_path
                    .as_deref()
                    .and_then(|p| p.split_whitespace().next())
                    .map(str::to_string);
                if import_path.is_some() && import_path != self.build_package {
                    self.build_package.clone_from(&import_path);
                    events.push(Event::BuildOutput {
                        package: import_path.unwrap_or_default(),
                    });
                }
                events.extend(self.output(None, record.output.as_deref().unwrap_or_default()));
                events
            }
            ("build-fail", _) => Vec::new(),
            (action, test) => {
                debug!(action, ?test, "ignoring unrecognized test2json action");
                Vec::new()
            }
        }
    }

    /// Buffer output text and emit events for every completed line
    fn output(&mut self, test: Option<String>, text: &str) -> Vec<Event> {
        let buffer = self.partial.entry(test.clone()).or_default();
        buffer.push_str(text);
        let Some(end) = buffer.rfind('\n') else {
            return Vec::new();
        };
        let complete: String = buffer.drain(..=end).collect();
        complete
            .lines()
            .flat_map(|line| self.line_events(test.as_deref(), line))
            .collect()
    }

    /// Run a complete output line through the text parser
    fn line_events(&mut self, test: Option<&str>, line: &str) -> Vec<Event> {
        let mut events = Vec::new();
        for event in self.text.process_line(line) {
            match event {
                Event::RunStarted { .. }
                | Event::Pause { .. }
                | Event::Continue { .. }
                | Event::Result { .. }
                | Event::BuildFailure { .. }
                | Event::NoTestFiles { .. } => {}
                Event::PackageResult {
                    cached, coverage, ..
                } => {
                    self.cached |= cached;
                    if let Some(percent) = coverage {
                        events.push(Event::Coverage {
                            percent,
                            packages: Vec::new(),
                        });
                    }
                }
                Event::BuildOutput { ref package }
                    if self.build_package.as_deref() == Some(package.as_str()) => {}
                Event::Output { line, .. } => events.push(Event::Output {
                    line,
                    test: test.map(str::to_string),
                }),
                Event::DataRace { .. } => events.push(Event::DataRace {
                    test: test.map(str::to_string),
                }),
                other => events.push(other),
            }
        }
        events
    }

    fn flush_partial(&mut self, test: Option<&str>) -> Vec<Event> {
        let key = test.map(str::to_string);
        match self.partial.remove(&key) {
            Some(rest) if !rest.is_empty() => self.line_events(test, &rest),
            _ => Vec::new(),
        }
    }

    fn flush_all(&mut self) -> Vec<Event> {
        let mut keys: Vec<Option<String>> = self.partial.keys().cloned().collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|key| self.flush_partial(key.as_deref()))
            .collect()
    }
}

impl EventParser for GoJsonParser {
    fn process_line(&mut self, line: &str) -> Vec<Event> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return vec![Event::output(line)];
        }
        match serde_json::from_str::<TestRecord>(trimmed) {
            Ok(record) => self.process_record(record),
            Err(err) => {
                debug!(error = %err, "line is not a test2json record, keeping as output");
                vec![Event::output(line)]
            }
        }
    }

    fn finish(&mut self) -> Vec<Event> {
        self.flush_all()
    }
}

/// Convert test2json's float seconds, rounded to the nanosecond
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn elapsed(secs: Option<f64>) -> Duration {
    secs.filter(|s| s.is_finite() && *s >= 0.0 && *s < u64::MAX as f64 / 1e9)
        .map(|s| Duration::from_nanos((s * 1e9).round() as u64))
        .unwrap_or_default()
}
