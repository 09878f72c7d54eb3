// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the report builder
//!
//! Feeds arbitrary event sequences, including ones no parser would emit,
//! straight into the builder.

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use gotest_report::{Event, Outcome, ReportBuilder, ReportConfig, SubtestMode};

const NAMES: [&str; 6] = ["TestA", "TestA/sub", "TestA/sub/x", "TestB", "BenchmarkX", "pkg"];

#[derive(Debug, Arbitrary)]
enum Step {
    Run(u8),
    Pause(u8),
    Cont(u8),
    Result(u8, u8, u16),
    Status(u8),
    Package(u8, bool),
    Start(u8),
    BuildOutput(u8),
    BuildFailure(u8),
    NoTests(u8),
    Bench(u8, u16),
    BenchEnd(u8, u8),
    Race(Option<u8>),
    Output(Option<u8>, String),
}

fn name(i: u8) -> String {
    NAMES[usize::from(i) % NAMES.len()].to_string()
}

fn outcome(i: u8) -> Outcome {
    match i % 4 {
        0 => Outcome::Pass,
        1 => Outcome::Fail,
        2 => Outcome::Skip,
        _ => Outcome::Unknown,
    }
}

impl Step {
    fn into_event(self) -> Event {
        match self {
            Self::Run(n) => Event::RunStarted { name: name(n) },
            Self::Pause(n) => Event::Pause { name: name(n) },
            Self::Cont(n) => Event::Continue { name: name(n) },
            Self::Result(n, o, ms) => Event::Result {
                name: name(n),
                outcome: outcome(o),
                duration: Duration::from_millis(u64::from(ms)),
                indent: usize::from(n % 3),
            },
            Self::Status(o) => Event::Status { outcome: outcome(o) },
            Self::Package(n, cached) => Event::PackageResult {
                package: name(n),
                outcome: outcome(n),
                elapsed: None,
                cached,
                coverage: None,
            },
            Self::Start(n) => Event::PackageStart { package: name(n) },
            Self::BuildOutput(n) => Event::BuildOutput { package: name(n) },
            Self::BuildFailure(n) => Event::BuildFailure {
                package: name(n),
                cause: "[build failed]".to_string(),
                elapsed: None,
            },
            Self::NoTests(n) => Event::NoTestFiles {
                package: name(n),
                elapsed: None,
            },
            Self::Bench(n, ns) => Event::BenchmarkResult {
                name: name(n),
                iterations: 1,
                ns_per_op: f64::from(ns),
                mb_per_sec: 0.0,
                bytes_per_op: 0,
                allocs_per_op: 0,
            },
            Self::BenchEnd(n, o) => Event::BenchmarkEnd {
                name: name(n),
                outcome: outcome(o),
            },
            Self::Race(n) => Event::DataRace { test: n.map(name) },
            Self::Output(n, line) => Event::Output {
                line,
                test: n.map(name),
            },
        }
    }
}

fuzz_target!(|input: (u8, Vec<Step>)| {
    let (mode, steps) = input;
    let mode = match mode % 3 {
        0 => SubtestMode::Default,
        1 => SubtestMode::IgnoreParentResults,
        _ => SubtestMode::ExcludeParents,
    };
    let config = ReportConfig::default().with_subtest_mode(mode);
    let mut builder = ReportBuilder::new(&config);
    for step in steps {
        builder.process_event(step.into_event());
    }
    let _ = builder.build();
});
