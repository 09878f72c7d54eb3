// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report model
//!
//! A [`Report`] is produced once per run by the
//! [`ReportBuilder`](crate::builder::ReportBuilder) and is not modified
//! afterwards. Serializers map it onto their own schema.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::benchmark::Benchmark;
use crate::collector::TestId;
use crate::event::Outcome;

/// The finished report for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Host the report was generated on
    pub hostname: Option<String>,
    /// Generation time
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied properties, passed through untouched
    pub properties: BTreeMap<String, String>,
    /// Packages in the order their results were seen
    pub packages: Vec<Package>,
}

impl Report {
    /// Total number of tests across all packages
    #[must_use]
    pub fn tests(&self) -> usize {
        self.packages.iter().map(Package::test_count).sum()
    }

    /// Total number of failed tests, including build errors
    #[must_use]
    pub fn failures(&self) -> usize {
        self.packages
            .iter()
            .map(|p| p.failures() + p.errors())
            .sum()
    }

    /// Total number of skipped tests
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.packages.iter().map(Package::skipped).sum()
    }

    /// Check if every package passed
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.packages.iter().all(|p| !p.outcome.is_fail())
    }

    /// Look up a package by name
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Results for one Go package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    /// Import path
    pub name: String,
    /// Overall outcome
    pub outcome: Outcome,
    /// Elapsed time as reported, or the sum of test durations
    pub duration: Duration,
    /// When the package was finalized
    pub timestamp: DateTime<Utc>,
    /// Result was served from the test cache
    pub cached: bool,
    /// Statement coverage percentage
    pub coverage: Option<f64>,
    /// Properties observed in the output (`goos`, `goarch`, `pkg`, `cpu`)
    pub properties: BTreeMap<String, String>,
    /// Output not attributed to any test
    pub output: Vec<String>,
    /// Tests in creation order
    pub tests: Vec<Test>,
}

impl Package {
    /// Number of tests, pseudo-tests included
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Number of failed tests, excluding build errors
    #[must_use]
    pub fn failures(&self) -> usize {
        self.tests
            .iter()
            .filter(|t| t.outcome.is_fail() && !t.origin.is_build_error())
            .count()
    }

    /// Number of build errors
    #[must_use]
    pub fn errors(&self) -> usize {
        self.tests
            .iter()
            .filter(|t| t.origin.is_build_error())
            .count()
    }

    /// Number of skipped tests
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.tests
            .iter()
            .filter(|t| t.outcome == Outcome::Skip)
            .count()
    }

    /// Look up a test by name, returning the first match
    #[must_use]
    pub fn test(&self, name: &str) -> Option<&Test> {
        self.tests.iter().find(|t| t.name == name)
    }

    /// The build error pseudo-test, if the package failed to build
    #[must_use]
    pub fn build_error(&self) -> Option<&Test> {
        self.tests.iter().find(|t| t.origin.is_build_error())
    }
}

/// A single test, subtest or benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Test {
    /// Unique within a run
    pub id: TestId,
    /// Full name, `Parent/Sub` for subtests
    pub name: String,
    /// Owning package name
    pub classname: String,
    /// Outcome
    pub outcome: Outcome,
    /// Reported duration
    pub duration: Duration,
    /// Nesting depth, 0 for top-level tests
    pub level: usize,
    /// Captured output lines
    pub output: Vec<String>,
    /// Kind-specific side data
    pub data: TestData,
    /// Whether this test appeared in the output or was synthesized
    pub origin: TestOrigin,
}

impl Test {
    /// Create a test with no outcome yet
    #[must_use]
    pub fn new(id: TestId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            classname: String::new(),
            outcome: Outcome::Unknown,
            duration: Duration::ZERO,
            level: 0,
            output: Vec::new(),
            data: TestData::None,
            origin: TestOrigin::Explicit,
        }
    }

    /// Check if this is a benchmark
    #[must_use]
    pub fn is_benchmark(&self) -> bool {
        self.name.starts_with("Benchmark")
    }

    /// Benchmark statistics, if any
    #[must_use]
    pub fn benchmark(&self) -> Option<&Benchmark> {
        match &self.data {
            TestData::Benchmark(bench) => Some(bench),
            _ => None,
        }
    }

    /// Check if a data race was reported while this test ran
    #[must_use]
    pub fn raced(&self) -> bool {
        matches!(self.data, TestData::Race(_))
    }

    /// Output joined into a single message
    #[must_use]
    pub fn message(&self) -> String {
        self.output.join("\n")
    }
}

/// Side data attached to a test
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestData {
    /// Nothing attached
    #[default]
    None,
    /// Benchmark statistics
    Benchmark(Benchmark),
    /// Data race detector report
    Race(RaceInfo),
}

/// Data races reported during a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RaceInfo {
    /// Number of `WARNING: DATA RACE` reports
    pub reports: usize,
}

/// How a test entered the report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestOrigin {
    /// Named in the test output
    #[default]
    Explicit,
    /// Stands in for a package that failed to build
    BuildError {
        /// Bracketed cause, e.g. `[build failed]`
        cause: String,
    },
    /// Stands in for a package that failed outside any test
    RunError,
}

impl TestOrigin {
    /// Check if this is a build error pseudo-test
    #[must_use]
    pub fn is_build_error(&self) -> bool {
        matches!(self, Self::BuildError { .. })
    }

    /// Check if this is a synthesized pseudo-test
    #[must_use]
    pub fn is_pseudo(&self) -> bool {
        !matches!(self, Self::Explicit)
    }
}
