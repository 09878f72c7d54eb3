// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Folding events into a [`Report`]
//!
//! The builder is a left fold over the event sequence. It never fails:
//! inconsistent input (results without a matching run, benchmarks nobody
//! announced, stray output) is reconstructed on a best-effort basis.
//!
//! # Example
//!
//! ```
//! use gotest_report::builder::ReportBuilder;
//! use gotest_report::config::ReportConfig;
//! use gotest_report::event::{Event, Outcome};
//! use std::time::Duration;
//!
//! let mut builder = ReportBuilder::new(&ReportConfig::default());
//! builder.process_event(Event::RunStarted { name: "TestA".to_string() });
//! builder.process_event(Event::Result {
//!     name: "TestA".to_string(),
//!     outcome: Outcome::Pass,
//!     duration: Duration::ZERO,
//!     indent: 0,
//! });
//! let report = builder.build();
//! assert_eq!(report.tests(), 1);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::benchmark::{self, Benchmark};
use crate::collector::{IdAllocator, OutputCollector, PACKAGE_SLOT, TestId};
use crate::config::{ReportConfig, SubtestMode};
use crate::event::{Event, Outcome};
use crate::report::{Package, RaceInfo, Report, Test, TestData, TestOrigin};

/// Summary details carried into package finalization
#[derive(Debug, Clone, Default)]
struct PackageSummary {
    outcome: Outcome,
    elapsed: Option<Duration>,
    cached: bool,
    coverage: Option<f64>,
}

/// Builds a [`Report`] from a sequence of events
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    packages: Vec<Package>,

    // per-package state
    tests: BTreeMap<TestId, Test>,
    open: Vec<TestId>,
    parents: HashMap<TestId, TestId>,
    parent_ids: HashSet<TestId>,
    cursor: Option<TestId>,
    coverage: Option<f64>,
    properties: BTreeMap<String, String>,
    package_raced: bool,
    status: Option<Outcome>,
    current_package: Option<String>,

    // run-wide state
    build_errors: BTreeMap<TestId, String>,
    output: OutputCollector,
    ids: IdAllocator,

    // options
    package_name: Option<String>,
    subtest_mode: SubtestMode,
    hostname: Option<String>,
    report_properties: BTreeMap<String, String>,
    timestamp: fn() -> DateTime<Utc>,
}

impl ReportBuilder {
    /// Create a builder for one run
    #[must_use]
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            packages: Vec::new(),
            tests: BTreeMap::new(),
            open: Vec::new(),
            parents: HashMap::new(),
            parent_ids: HashSet::new(),
            cursor: None,
            coverage: None,
            properties: BTreeMap::new(),
            package_raced: false,
            status: None,
            current_package: None,
            build_errors: BTreeMap::new(),
            output: OutputCollector::new(),
            ids: IdAllocator::new(),
            package_name: config.package_name.clone(),
            subtest_mode: config.subtest_mode,
            hostname: config.hostname.clone(),
            report_properties: config.properties.clone(),
            timestamp: config.timestamp,
        }
    }

    /// Fold a single event into the report under construction
    pub fn process_event(&mut self, event: Event) {
        match event {
            Event::RunStarted { name } => {
                self.create_test(&name);
            }
            Event::Pause { name } => self.pause_test(&name),
            Event::Continue { name } => self.continue_test(&name),
            Event::Result {
                name,
                outcome,
                duration,
                indent,
            } => self.end_test(&name, outcome, duration, indent),
            Event::Status { outcome } => {
                self.status = Some(outcome);
                self.cursor = None;
            }
            Event::PackageResult {
                package,
                outcome,
                elapsed,
                cached,
                coverage,
            } => self.finalize_package(
                package,
                PackageSummary {
                    outcome,
                    elapsed,
                    cached,
                    coverage,
                },
            ),
            Event::PackageStart { package } => self.current_package = Some(package),
            Event::BuildOutput { package } => self.create_build_error(package),
            Event::BuildFailure {
                package,
                cause,
                elapsed,
            } => self.build_failure(package, cause, elapsed),
            Event::NoTestFiles { package, elapsed } => self.finalize_package(
                package,
                PackageSummary {
                    outcome: Outcome::Skip,
                    elapsed,
                    ..PackageSummary::default()
                },
            ),
            Event::Coverage { percent, .. } => self.coverage = Some(percent),
            Event::Metadata { key, value } => {
                self.properties.insert(key, value);
            }
            Event::BenchmarkResult {
                name,
                iterations,
                ns_per_op,
                mb_per_sec,
                bytes_per_op,
                allocs_per_op,
            } => self.benchmark_result(
                &name,
                Benchmark {
                    iterations,
                    ns_per_op,
                    mb_per_sec,
                    bytes_per_op,
                    allocs_per_op,
                },
            ),
            Event::BenchmarkEnd { name, outcome } => self.end_benchmark(&name, outcome),
            Event::DataRace { test } => self.data_race(test.as_deref()),
            Event::Output { line, test } => self.append_output(line, test.as_deref()),
        }
    }

    /// Finish the run and return the report
    #[must_use]
    pub fn build(mut self) -> Report {
        self.flush();
        Report {
            hostname: self.hostname,
            timestamp: (self.timestamp)(),
            properties: self.report_properties,
            packages: self.packages,
        }
    }

    /// Find the test a name refers to
    ///
    /// Open tests win, innermost (most recently opened) first. Otherwise the
    /// most recently created test with that name is returned.
    fn find_test(&self, name: &str) -> Option<TestId> {
        self.find_open_test(name).or_else(|| {
            self.tests
                .iter()
                .rev()
                .find(|(_, t)| t.name == name)
                .map(|(id, _)| *id)
        })
    }

    /// Find an open test by name, innermost first
    fn find_open_test(&self, name: &str) -> Option<TestId> {
        self.open
            .iter()
            .rev()
            .copied()
            .find(|id| self.tests.get(id).is_some_and(|t| t.name == name))
    }

    /// Find the closest existing ancestor of a `Parent/Sub` name
    fn find_parent(&self, name: &str) -> Option<TestId> {
        let mut parent = name;
        while let Some(idx) = parent.rfind('/') {
            parent = &parent[..idx];
            if let Some(id) = self.find_test(parent) {
                return Some(id);
            }
        }
        None
    }

    fn create_test(&mut self, name: &str) -> TestId {
        let parent = self.find_parent(name);
        self.insert_test(name, parent)
    }

    fn insert_test(&mut self, name: &str, parent: Option<TestId>) -> TestId {
        let id = self.ids.allocate();
        let mut test = Test::new(id, name);
        if let Some(parent) = parent {
            test.level = self.tests.get(&parent).map_or(0, |p| p.level + 1);
            self.parents.insert(id, parent);
            self.parent_ids.insert(parent);
        }
        self.tests.insert(id, test);
        self.open.push(id);
        self.cursor = Some(id);
        id
    }

    fn pause_test(&mut self, name: &str) {
        if self.find_test(name).is_none() {
            debug!(test = name, "pause for unknown test");
        }
    }

    fn continue_test(&mut self, name: &str) {
        match self.find_test(name) {
            Some(id) => self.cursor = Some(id),
            None => debug!(test = name, "continue for unknown test"),
        }
    }

    /// Record a result; a test that already has one is never overwritten
    fn end_test(&mut self, name: &str, outcome: Outcome, duration: Duration, indent: usize) {
        let id = self.find_open_test(name).unwrap_or_else(|| {
            debug!(test = name, "result without a matching run, synthesizing test");
            self.create_test(name)
        });
        if let Some(test) = self.tests.get_mut(&id) {
            test.outcome = if test.raced() { Outcome::Fail } else { outcome };
            test.duration = duration;
            test.level = test.level.max(indent);
        }
        self.open.retain(|open| *open != id);
        self.cursor = Some(id);
    }

    fn benchmark_result(&mut self, name: &str, stats: Benchmark) {
        let announced = self
            .find_open_test(name)
            .filter(|id| self.tests.get(id).is_some_and(|t| t.data == TestData::None));
        let id = announced.unwrap_or_else(|| self.insert_test(name, None));
        if let Some(test) = self.tests.get_mut(&id) {
            test.data = TestData::Benchmark(stats);
        }
        self.open.retain(|open| *open != id);
    }

    fn end_benchmark(&mut self, name: &str, outcome: Outcome) {
        let id = self.find_test(name).unwrap_or_else(|| self.create_test(name));
        if let Some(test) = self.tests.get_mut(&id) {
            test.outcome = outcome;
        }
        self.open.retain(|open| *open != id);
        self.cursor = Some(id);
    }

    fn data_race(&mut self, test: Option<&str>) {
        let target = test
            .and_then(|name| self.find_test(name))
            .or(self.cursor)
            .filter(|id| self.tests.contains_key(id));
        match target.and_then(|id| self.tests.get_mut(&id)) {
            Some(test) => {
                let reports = match test.data {
                    TestData::Race(info) => info.reports + 1,
                    _ => 1,
                };
                test.data = TestData::Race(RaceInfo { reports });
                test.outcome = Outcome::Fail;
                debug!(test = %test.name, "data race marks test failed");
            }
            None => {
                self.package_raced = true;
                debug!("data race outside any test marks package failed");
            }
        }
    }

    fn append_output(&mut self, line: String, test: Option<&str>) {
        let target = test
            .and_then(|name| self.find_test(name))
            .or(self.cursor)
            .unwrap_or(PACKAGE_SLOT);
        self.output.append(target, line);
    }

    fn create_build_error(&mut self, package: String) {
        let id = self.ids.allocate();
        self.build_errors.insert(id, package);
        self.cursor = Some(id);
    }

    fn build_failure(&mut self, package: String, cause: String, elapsed: Option<Duration>) {
        let recorded = self
            .build_errors
            .iter()
            .find(|(_, name)| *name == &package || name.trim_end_matches("_test") == package)
            .map(|(id, _)| *id);
        let (id, output) = match recorded {
            Some(id) => {
                self.build_errors.remove(&id);
                (id, self.output.take(id))
            }
            None => (self.ids.allocate(), self.output.take(PACKAGE_SLOT)),
        };
        if self.cursor == Some(id) {
            self.cursor = None;
        }

        let duration = elapsed.unwrap_or_default();
        let pseudo = Test {
            classname: package.clone(),
            outcome: Outcome::Fail,
            duration,
            output,
            origin: TestOrigin::BuildError { cause },
            ..Test::new(id, package.clone())
        };
        info!(package = %package, "package failed to build");
        self.packages.push(Package {
            name: package,
            outcome: Outcome::Fail,
            duration,
            timestamp: (self.timestamp)(),
            cached: false,
            coverage: None,
            properties: BTreeMap::new(),
            output: Vec::new(),
            tests: vec![pseudo],
        });
    }

    fn finalize_package(&mut self, name: String, summary: PackageSummary) {
        let tests = std::mem::take(&mut self.tests);
        let any_failed = tests.values().any(|t| t.outcome.is_fail());
        let failed = summary.outcome.is_fail() || self.package_raced;

        let mut collected = Vec::with_capacity(tests.len() + 1);
        if failed && !any_failed {
            let id = self.ids.allocate();
            debug!(package = %name, "package failed outside any test, synthesizing test");
            collected.push(Test {
                classname: name.clone(),
                outcome: Outcome::Fail,
                duration: summary.elapsed.unwrap_or_default(),
                output: self.output.take(PACKAGE_SLOT),
                origin: TestOrigin::RunError,
                ..Test::new(id, name.clone())
            });
        }

        let failing_descendants = self.failing_ancestors(&tests);
        for (id, mut test) in tests {
            if self.parent_ids.contains(&id) {
                match self.subtest_mode {
                    SubtestMode::Default => {
                        if failing_descendants.contains(&id) {
                            test.outcome = Outcome::Fail;
                        }
                    }
                    SubtestMode::IgnoreParentResults => {
                        if !test.raced() {
                            test.outcome = Outcome::Pass;
                        }
                    }
                    SubtestMode::ExcludeParents => {
                        self.output.merge(id, PACKAGE_SLOT);
                        continue;
                    }
                }
            }
            if test.outcome == Outcome::Unknown && test.benchmark().is_some() {
                test.outcome = Outcome::Pass;
            }
            test.output = self.output.take(id);
            test.classname.clone_from(&name);
            collected.push(test);
        }
        let tests = benchmark::group_by_name(collected);

        let outcome = if failed || any_failed {
            Outcome::Fail
        } else if summary.outcome == Outcome::Skip {
            Outcome::Skip
        } else {
            Outcome::Pass
        };
        let duration = summary.elapsed.unwrap_or_else(|| {
            tests
                .iter()
                .filter(|t| t.level == 0)
                .map(|t| t.duration)
                .sum()
        });

        info!(package = %name, tests = tests.len(), %outcome, "finalized package");
        self.packages.push(Package {
            name,
            outcome,
            duration,
            timestamp: (self.timestamp)(),
            cached: summary.cached,
            coverage: summary.coverage.or(self.coverage),
            properties: std::mem::take(&mut self.properties),
            output: self.output.take(PACKAGE_SLOT),
            tests,
        });

        self.open.clear();
        self.parents.clear();
        self.parent_ids.clear();
        self.cursor = None;
        self.coverage = None;
        self.package_raced = false;
        self.status = None;
        self.current_package = None;
    }

    /// IDs of tests that have at least one failing descendant
    fn failing_ancestors(&self, tests: &BTreeMap<TestId, Test>) -> HashSet<TestId> {
        let mut failing = HashSet::new();
        for (id, test) in tests {
            if !test.outcome.is_fail() {
                continue;
            }
            let mut current = *id;
            while let Some(parent) = self.parents.get(&current) {
                if !failing.insert(*parent) {
                    break;
                }
                current = *parent;
            }
        }
        failing
    }

    /// Attribute whatever is still pending at end of input
    fn flush(&mut self) {
        let leftover: Vec<TestId> = std::mem::take(&mut self.build_errors).into_keys().collect();
        for id in leftover {
            debug!(id, "build output without a matching failure, keeping as output");
            self.output.merge(id, PACKAGE_SLOT);
        }

        // `go test ./...` ends with a bare FAIL after the last summary
        let status_failed = self.status.is_some_and(Outcome::is_fail) && self.packages.is_empty();
        if !self.tests.is_empty() || self.package_raced || status_failed {
            let name = self
                .current_package
                .clone()
                .or_else(|| self.package_name.clone())
                .unwrap_or_default();
            let summary = PackageSummary {
                outcome: self.status.unwrap_or_default(),
                ..PackageSummary::default()
            };
            self.finalize_package(name, summary);
        } else if self.output.contains(PACKAGE_SLOT) {
            let stray = self.output.take(PACKAGE_SLOT);
            match self.packages.last_mut() {
                Some(package) => package.output.extend(stray),
                None => {
                    let name = self
                        .current_package
                        .clone()
                        .or_else(|| self.package_name.clone())
                        .unwrap_or_default();
                    self.packages.push(Package {
                        name,
                        outcome: Outcome::Unknown,
                        duration: Duration::ZERO,
                        timestamp: (self.timestamp)(),
                        cached: false,
                        coverage: self.coverage,
                        properties: std::mem::take(&mut self.properties),
                        output: stray,
                        tests: Vec::new(),
                    });
                }
            }
        }
    }
}
