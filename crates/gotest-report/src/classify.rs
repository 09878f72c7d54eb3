// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Classification of individual `go test` output lines
//!
//! Every line maps to exactly one [`Line`]. Shapes are tried in a fixed
//! priority order and anything unrecognized is [`Line::Output`], so
//! classification is total.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::event::Outcome;

static END_TEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:    )*)--- (PASS|FAIL|SKIP): ([^ ]+) \((\d+\.\d+)(?: seconds|s)\)")
        .expect("valid end test regex")
});

static STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(PASS|FAIL|SKIP)$").expect("valid status regex"));

static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        // 1: result
        r"^(\?|ok|FAIL)",
        // 2: package
        r"\s+([^ \t]+)",
        // 3: elapsed
        r"(?:\s+(\d+\.\d+)s)?",
        // 4: cached marker
        r"(?:\s+(\(cached\)))?",
        // 5: status message
        r"(?:\s+(\[[^\]]+\]))?",
        // 6: coverage, 7: coverpkg list
        r"(?:\s+coverage:\s+(?:\[no statements\]|(\d+\.\d+)%\s+of\s+statements(?:\sin\s([^\[]+?))?))?",
        // 8: status message printed after coverage
        r"(?:\s+(\[[^\]]+\]))?$",
    ))
    .expect("valid summary regex")
});

static COVERAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^coverage:\s+(\d+|\d+\.\d+)%\s+of\s+statements(?:\sin\s(.+))?$")
        .expect("valid coverage regex")
});

static METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(goos|goarch|pkg|cpu):\s+(.+)$").expect("valid metadata regex")
});

static BENCH_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(Benchmark[^ -]+)(?:-(\d+)\s+|\s+)(\d+)\s+(\d+|\d+\.\d+)\sns/op",
        r"(?:\s+(\d+|\d+\.\d+)\sMB/s)?",
        r"(?:\s+(\d+)\sB/op)?",
        r"(?:\s+(\d+)\sallocs/op)?",
    ))
    .expect("valid benchmark summary regex")
});

static END_BENCHMARK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--- (BENCH|FAIL|SKIP): (Benchmark[^ -]+)(?:-\d+)?$")
        .expect("valid end benchmark regex")
});

/// A classified line of free-text test output
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    /// `=== RUN name`
    Run(&'a str),
    /// `=== PAUSE name`
    Pause(&'a str),
    /// `=== CONT name` or `=== NAME name`
    Cont(&'a str),
    /// `--- PASS: name (0.00s)`, possibly preceded by unterminated output
    EndTest {
        /// Text before the marker on the same line
        prefix: &'a str,
        /// Four-space indentation groups
        indent: usize,
        /// Reported outcome
        outcome: Outcome,
        /// Test name
        name: &'a str,
        /// Reported duration
        duration: Duration,
    },
    /// Bare `PASS`, `FAIL` or `SKIP`
    Status(Outcome),
    /// `ok pkg 0.01s`, `FAIL pkg [build failed]`, `? pkg [no test files]`
    Summary {
        /// `?`, `ok` or `FAIL`
        result: &'a str,
        /// Package import path
        package: &'a str,
        /// Elapsed time
        elapsed: Option<Duration>,
        /// `(cached)` marker present
        cached: bool,
        /// Bracketed status message, e.g. `[build failed]`
        message: Option<&'a str>,
        /// Coverage percentage
        coverage: Option<f64>,
    },
    /// `coverage: 12.5% of statements [in a, b]`
    Coverage {
        /// Percentage
        percent: f64,
        /// Packages listed after `in`
        packages: Vec<&'a str>,
    },
    /// `goos: linux`, `goarch: amd64`, `pkg: path`, `cpu: model`
    Metadata {
        /// Key
        key: &'a str,
        /// Value
        value: &'a str,
    },
    /// Benchmark result line
    Benchmark {
        /// Benchmark name without the GOMAXPROCS suffix
        name: &'a str,
        /// Iteration count
        iterations: i64,
        /// Nanoseconds per operation
        ns_per_op: f64,
        /// MB/s throughput
        mb_per_sec: f64,
        /// Bytes per operation
        bytes_per_op: i64,
        /// Allocations per operation
        allocs_per_op: i64,
    },
    /// `--- BENCH: BenchmarkX-8`
    EndBenchmark {
        /// Benchmark name
        name: &'a str,
        /// Reported outcome
        outcome: Outcome,
    },
    /// `# pkg` compiler header
    BuildHeader(&'a str),
    /// `WARNING: DATA RACE`
    DataRace,
    /// Anything else
    Output(&'a str),
}

/// Classify a single line of output
///
/// `line` must not contain its trailing newline.
#[must_use]
pub fn classify(line: &str) -> Line<'_> {
    if let Some(name) = line.strip_prefix("=== RUN ") {
        return Line::Run(name.trim());
    }
    if let Some(name) = line.strip_prefix("=== PAUSE ") {
        return Line::Pause(name.trim());
    }
    if let Some(name) = line
        .strip_prefix("=== CONT ")
        .or_else(|| line.strip_prefix("=== NAME "))
    {
        return Line::Cont(name.trim());
    }
    if let Some(caps) = END_TEST.captures(line) {
        let whole = caps.get(0).map_or(0, |m| m.start());
        let indent = caps.get(1).map_or(0, |m| m.as_str().len() / 4);
        return Line::EndTest {
            prefix: &line[..whole],
            indent,
            outcome: Outcome::from_status(&caps[2]),
            name: caps.get(3).map_or("", |m| m.as_str()),
            duration: parse_seconds(&caps[4]),
        };
    }
    if let Some(caps) = STATUS.captures(line) {
        return Line::Status(Outcome::from_status(&caps[1]));
    }
    if let Some(caps) = SUMMARY.captures(line) {
        return Line::Summary {
            result: caps.get(1).map_or("", |m| m.as_str()),
            package: caps.get(2).map_or("", |m| m.as_str()),
            elapsed: caps.get(3).map(|m| parse_seconds(m.as_str())),
            cached: caps.get(4).is_some(),
            message: caps.get(5).or_else(|| caps.get(8)).map(|m| m.as_str()),
            coverage: caps.get(6).and_then(|m| m.as_str().parse().ok()),
        };
    }
    if let Some(caps) = COVERAGE.captures(line) {
        return Line::Coverage {
            percent: caps[1].parse().unwrap_or_default(),
            packages: caps
                .get(2)
                .map(|m| split_packages(m.as_str()))
                .unwrap_or_default(),
        };
    }
    if let Some(caps) = METADATA.captures(line) {
        return Line::Metadata {
            key: caps.get(1).map_or("", |m| m.as_str()),
            value: caps.get(2).map_or("", |m| m.as_str().trim()),
        };
    }
    if let Some(caps) = BENCH_SUMMARY.captures(line) {
        return Line::Benchmark {
            name: caps.get(1).map_or("", |m| m.as_str()),
            iterations: parse_int(caps.get(3).map(|m| m.as_str())),
            ns_per_op: parse_float(caps.get(4).map(|m| m.as_str())),
            mb_per_sec: parse_float(caps.get(5).map(|m| m.as_str())),
            bytes_per_op: parse_int(caps.get(6).map(|m| m.as_str())),
            allocs_per_op: parse_int(caps.get(7).map(|m| m.as_str())),
        };
    }
    if let Some(caps) = END_BENCHMARK.captures(line) {
        return Line::EndBenchmark {
            name: caps.get(2).map_or("", |m| m.as_str()),
            outcome: Outcome::from_status(&caps[1]),
        };
    }
    if let Some(header) = line.strip_prefix("# ") {
        let fields: Vec<&str> = header.split_whitespace().collect();
        if matches!(fields.len(), 1 | 2) {
            return Line::BuildHeader(fields[0]);
        }
    }
    if line.trim() == "WARNING: DATA RACE" {
        return Line::DataRace;
    }
    Line::Output(line)
}

/// Parse a decimal number of seconds, as printed in durations
///
/// The fraction is read digit by digit, so `0.030` is exactly 30ms.
/// Malformed values yield zero.
#[must_use]
pub fn parse_seconds(secs: &str) -> Duration {
    let (whole, fraction) = secs.split_once('.').unwrap_or((secs, ""));
    let Ok(whole) = whole.parse::<u64>() else {
        return Duration::ZERO;
    };
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Duration::ZERO;
    }
    let nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    Duration::new(whole, nanos)
}

fn parse_int(value: Option<&str>) -> i64 {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

fn parse_float(value: Option<&str>) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

fn split_packages(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
