// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for building a report
//!
//! [`ReportConfig`] carries every knob the builder understands and is the
//! usual entry point: [`ReportConfig::run`] parses a whole stream and returns
//! the finished [`Report`].

use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::builder::ReportBuilder;
use crate::error::ReportError;
use crate::event::Event;
use crate::parser::{drive, parser_for};
use crate::report::Report;

/// How parent tests of subtests are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtestMode {
    /// A parent fails when it or any descendant fails
    #[default]
    Default,
    /// Parents always pass; only leaf results count
    IgnoreParentResults,
    /// Parents are left out; their output moves to the package
    ExcludeParents,
}

impl SubtestMode {
    /// Name accepted on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::IgnoreParentResults => "ignore-parent-results",
            Self::ExcludeParents => "exclude-parents",
        }
    }
}

impl FromStr for SubtestMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "default" => Ok(Self::Default),
            "ignore-parent-results" => Ok(Self::IgnoreParentResults),
            "exclude-parents" => Ok(Self::ExcludeParents),
            other => Err(ReportError::InvalidSubtestMode {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SubtestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format of the input stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Plain `go test` output, with or without `-v`
    #[default]
    GoTest,
    /// `go test -json` output
    GoJson,
}

impl InputFormat {
    /// Name accepted on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoTest => "gotest",
            Self::GoJson => "gojson",
        }
    }
}

impl FromStr for InputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gotest" => Ok(Self::GoTest),
            "gojson" => Ok(Self::GoJson),
            other => Err(ReportError::InvalidInputFormat {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for turning a test stream into a [`Report`]
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Package name used when the stream never names one
    pub package_name: Option<String>,
    /// How parents of subtests are reported
    pub subtest_mode: SubtestMode,
    /// Input format
    pub format: InputFormat,
    /// Hostname recorded on the report
    pub hostname: Option<String>,
    /// Extra properties recorded on the report
    pub properties: BTreeMap<String, String>,
    /// Clock used for report and package timestamps
    pub timestamp: fn() -> DateTime<Utc>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            package_name: None,
            subtest_mode: SubtestMode::Default,
            format: InputFormat::GoTest,
            hostname: None,
            properties: BTreeMap::new(),
            timestamp: Utc::now,
        }
    }
}

impl ReportConfig {
    /// Set the fallback package name
    #[must_use]
    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    /// Set the subtest mode
    #[must_use]
    pub fn with_subtest_mode(mut self, mode: SubtestMode) -> Self {
        self.subtest_mode = mode;
        self
    }

    /// Set the input format
    #[must_use]
    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the hostname
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Add a report property
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set the clock
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: fn() -> DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Parse `reader` to the end and build the report
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if reading from `reader` fails.
    pub fn run<R: BufRead>(&self, reader: R) -> Result<Report, ReportError> {
        self.run_with(reader, |_| {})
    }

    /// Like [`run`](Self::run), showing every event to `inspect` before the
    /// builder consumes it
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if reading from `reader` fails.
    pub fn run_with<R, F>(&self, reader: R, mut inspect: F) -> Result<Report, ReportError>
    where
        R: BufRead,
        F: FnMut(&Event),
    {
        let mut parser = parser_for(self.format);
        let mut builder = ReportBuilder::new(self);
        drive(reader, parser.as_mut(), |event| {
            inspect(&event);
            builder.process_event(event);
        })?;
        Ok(builder.build())
    }
}

/// Split a `key=value` property
///
/// Only the first `=` separates; either side may be empty.
///
/// # Errors
///
/// Returns `ReportError::InvalidProperty` if there is no `=`.
pub fn parse_property(value: &str) -> Result<(String, String), ReportError> {
    value
        .split_once('=')
        .map(|(key, val)| (key.to_string(), val.to_string()))
        .ok_or_else(|| ReportError::InvalidProperty {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_subtest_mode_from_str() {
        assert_eq!("".parse::<SubtestMode>().ok(), Some(SubtestMode::Default));
        assert_eq!(
            "ignore-parent-results".parse::<SubtestMode>().ok(),
            Some(SubtestMode::IgnoreParentResults)
        );
        assert_eq!(
            "exclude-parents".parse::<SubtestMode>().ok(),
            Some(SubtestMode::ExcludeParents)
        );
        assert!(matches!(
            "sometimes".parse::<SubtestMode>(),
            Err(ReportError::InvalidSubtestMode { .. })
        ));
    }

    #[test]
    fn test_input_format_round_trips_through_display() {
        for format in [InputFormat::GoTest, InputFormat::GoJson] {
            assert_eq!(format.to_string().parse::<InputFormat>().ok(), Some(format));
        }
        assert!("xml".parse::<InputFormat>().is_err());
    }

    #[test]
    fn test_parse_property() {
        assert_eq!(
            parse_property("go.version=1.22").ok(),
            Some(("go.version".to_string(), "1.22".to_string()))
        );
        assert_eq!(
            parse_property("empty=").ok(),
            Some(("empty".to_string(), String::new()))
        );
        assert_eq!(
            parse_property("=x").ok(),
            Some((String::new(), "x".to_string()))
        );
        assert_eq!(
            parse_property("a=b=c").ok(),
            Some(("a".to_string(), "b=c".to_string()))
        );
        assert!(parse_property("novalue").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = ReportConfig::default()
            .with_package_name("pkg")
            .with_subtest_mode(SubtestMode::ExcludeParents)
            .with_format(InputFormat::GoJson)
            .with_hostname("build-01")
            .with_property("k", "v");
        assert_eq!(config.package_name.as_deref(), Some("pkg"));
        assert_eq!(config.subtest_mode, SubtestMode::ExcludeParents);
        assert_eq!(config.format, InputFormat::GoJson);
        assert_eq!(config.hostname.as_deref(), Some("build-01"));
        assert_eq!(config.properties.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_run_counts_events() {
        let input = "=== RUN   TestA\n--- PASS: TestA (0.01s)\nPASS\nok  \tpkg\t0.011s\n";
        let mut seen = 0;
        let report = ReportConfig::default()
            .run_with(input.as_bytes(), |_| seen += 1)
            .expect("Should build report");
        assert_eq!(seen, 4);
        assert_eq!(report.tests(), 1);
        assert!(report.is_successful());
    }
}
