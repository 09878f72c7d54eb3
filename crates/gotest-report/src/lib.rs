// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gotest-report: Structured reports from `go test` output
//!
//! This library parses the output of `go test` (plain text, verbose or not,
//! or `go test -json`) into a stream of events and folds those events into a
//! [`Report`] of packages, tests, subtests and benchmarks.
//!
//! # Example
//!
//! ```
//! use gotest_report::config::ReportConfig;
//! use gotest_report::event::Outcome;
//!
//! let output = "\
//! === RUN   TestOne
//! --- PASS: TestOne (0.06s)
//! === RUN   TestTwo
//!     two_test.go:12: not today
//! --- FAIL: TestTwo (0.10s)
//! FAIL
//! FAIL\tpackage/name\t0.160s
//! ";
//!
//! let report = ReportConfig::default().run(output.as_bytes()).unwrap();
//! let package = report.package("package/name").unwrap();
//! assert_eq!(package.outcome, Outcome::Fail);
//! assert_eq!(package.tests.len(), 2);
//! assert_eq!(package.tests[1].output, vec!["    two_test.go:12: not today"]);
//! ```

pub mod benchmark;
pub mod builder;
pub mod classify;
pub mod collector;
pub mod config;
pub mod error;
pub mod event;
pub mod gojson;
pub mod gotest;
pub mod parser;
pub mod report;

pub use builder::ReportBuilder;
pub use config::{InputFormat, ReportConfig, SubtestMode, parse_property};
pub use error::ReportError;
pub use event::{Event, Outcome};
pub use parser::{EventParser, drive, parse_events, parser_for};
pub use report::{Package, Report, Test, TestData, TestOrigin};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::builder::ReportBuilder;
    pub use crate::config::{InputFormat, ReportConfig, SubtestMode};
    pub use crate::error::ReportError;
    pub use crate::event::{Event, Outcome};
    pub use crate::parser::EventParser;
    pub use crate::report::{Package, Report, Test};
}
