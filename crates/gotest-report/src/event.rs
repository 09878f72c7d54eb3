// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test lifecycle events
//!
//! Both parsers reduce their input to the same closed set of [`Event`]s. Events
//! refer to tests and packages by name only; the builder resolves names to
//! concrete tests.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome of a test, benchmark or package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Passed
    Pass,
    /// Failed
    Fail,
    /// Skipped
    Skip,
    /// No terminal status seen yet
    #[default]
    Unknown,
}

impl Outcome {
    /// Parse the status word go test prints (`PASS`, `FAIL`, `SKIP`, `BENCH`,
    /// `ok`) or the gojson action name (`pass`, `fail`, `skip`)
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "PASS" | "BENCH" | "ok" | "pass" => Self::Pass,
            "FAIL" | "fail" => Self::Fail,
            "SKIP" | "skip" => Self::Skip,
            _ => Self::Unknown,
        }
    }

    /// Check if this outcome is a failure
    #[must_use]
    pub fn is_fail(self) -> bool {
        self == Self::Fail
    }

    /// Upper-case label as printed by go test
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single lifecycle signal extracted from test output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// `=== RUN name`
    RunStarted {
        /// Full test name, `Parent/Sub` for subtests
        name: String,
    },
    /// `=== PAUSE name`
    Pause {
        /// Test name
        name: String,
    },
    /// `=== CONT name`
    Continue {
        /// Test name
        name: String,
    },
    /// `--- PASS: name (0.00s)` and friends
    Result {
        /// Test name
        name: String,
        /// Reported outcome
        outcome: Outcome,
        /// Reported duration
        duration: Duration,
        /// Number of four-space indentation groups before the marker
        indent: usize,
    },
    /// A bare `PASS`, `FAIL` or `SKIP` line
    Status {
        /// Reported outcome
        outcome: Outcome,
    },
    /// `ok pkg 0.01s` or `FAIL pkg 0.01s`
    PackageResult {
        /// Package import path
        package: String,
        /// Reported outcome
        outcome: Outcome,
        /// Elapsed time, when printed
        elapsed: Option<Duration>,
        /// Result was served from the test cache
        cached: bool,
        /// Coverage percentage printed on the summary line
        coverage: Option<f64>,
    },
    /// A package started running (structured input only)
    PackageStart {
        /// Package import path
        package: String,
    },
    /// `# pkg` header introducing compiler diagnostics
    BuildOutput {
        /// Package import path
        package: String,
    },
    /// `FAIL pkg [build failed]`
    BuildFailure {
        /// Package import path
        package: String,
        /// Bracketed status message, e.g. `[build failed]`
        cause: String,
        /// Elapsed time, when printed
        elapsed: Option<Duration>,
    },
    /// `? pkg [no test files]`
    NoTestFiles {
        /// Package import path
        package: String,
        /// Elapsed time, when printed
        elapsed: Option<Duration>,
    },
    /// `coverage: 12.5% of statements`
    Coverage {
        /// Statement coverage percentage
        percent: f64,
        /// Packages named by `-coverpkg`, if listed
        packages: Vec<String>,
    },
    /// `goos: linux` and the other benchmark environment lines
    Metadata {
        /// Property key
        key: String,
        /// Property value
        value: String,
    },
    /// `BenchmarkX-8  1000  123 ns/op ...`
    BenchmarkResult {
        /// Benchmark name without the GOMAXPROCS suffix
        name: String,
        /// Iteration count
        iterations: i64,
        /// Nanoseconds per operation
        ns_per_op: f64,
        /// Throughput, when the benchmark called `SetBytes`
        mb_per_sec: f64,
        /// Bytes allocated per operation (`-benchmem`)
        bytes_per_op: i64,
        /// Allocations per operation (`-benchmem`)
        allocs_per_op: i64,
    },
    /// `--- BENCH: BenchmarkX-8` and friends
    BenchmarkEnd {
        /// Benchmark name without the GOMAXPROCS suffix
        name: String,
        /// Reported outcome
        outcome: Outcome,
    },
    /// `WARNING: DATA RACE`
    DataRace {
        /// Test the report belongs to, when the input says so explicitly
        test: Option<String>,
    },
    /// Any other line
    Output {
        /// The line, without its terminator
        line: String,
        /// Test the line belongs to, when the input says so explicitly
        test: Option<String>,
    },
}

impl Event {
    /// Create an output event not tied to a named test
    #[must_use]
    pub fn output(line: impl Into<String>) -> Self {
        Self::Output {
            line: line.into(),
            test: None,
        }
    }

    /// Short name of the event kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::Pause { .. } => "pause",
            Self::Continue { .. } => "continue",
            Self::Result { .. } => "result",
            Self::Status { .. } => "status",
            Self::PackageResult { .. } => "package_result",
            Self::PackageStart { .. } => "package_start",
            Self::BuildOutput { .. } => "build_output",
            Self::BuildFailure { .. } => "build_failure",
            Self::NoTestFiles { .. } => "no_test_files",
            Self::Coverage { .. } => "coverage",
            Self::Metadata { .. } => "metadata",
            Self::BenchmarkResult { .. } => "benchmark_result",
            Self::BenchmarkEnd { .. } => "benchmark_end",
            Self::DataRace { .. } => "data_race",
            Self::Output { .. } => "output",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted { name } | Self::Pause { name } | Self::Continue { name } => {
                write!(f, "{} {name}", self.kind())
            }
            Self::Result {
                name,
                outcome,
                duration,
                indent,
            } => write!(
                f,
                "result {name} {outcome} {:.3}s indent={indent}",
                duration.as_secs_f64()
            ),
            Self::Status { outcome } => write!(f, "status {outcome}"),
            Self::PackageResult {
                package,
                outcome,
                elapsed,
                cached,
                coverage,
            } => {
                write!(f, "package_result {package} {outcome}")?;
                if let Some(elapsed) = elapsed {
                    write!(f, " {:.3}s", elapsed.as_secs_f64())?;
                }
                if *cached {
                    f.write_str(" (cached)")?;
                }
                if let Some(pct) = coverage {
                    write!(f, " coverage={pct}%")?;
                }
                Ok(())
            }
            Self::PackageStart { package }
            | Self::BuildOutput { package }
            | Self::NoTestFiles { package, .. } => write!(f, "{} {package}", self.kind()),
            Self::BuildFailure { package, cause, .. } => {
                write!(f, "build_failure {package} {cause}")
            }
            Self::Coverage { percent, packages } => {
                write!(f, "coverage {percent}%")?;
                if !packages.is_empty() {
                    write!(f, " in {}", packages.join(", "))?;
                }
                Ok(())
            }
            Self::Metadata { key, value } => write!(f, "metadata {key}={value}"),
            Self::BenchmarkResult {
                name,
                iterations,
                ns_per_op,
                ..
            } => write!(f, "benchmark_result {name} {iterations} {ns_per_op} ns/op"),
            Self::BenchmarkEnd { name, outcome } => write!(f, "benchmark_end {name} {outcome}"),
            Self::DataRace { test } => match test {
                Some(test) => write!(f, "data_race [{test}]"),
                None => f.write_str("data_race"),
            },
            Self::Output { line, test } => match test {
                Some(test) => write!(f, "output [{test}] {line:?}"),
                None => write!(f, "output {line:?}"),
            },
        }
    }
}
