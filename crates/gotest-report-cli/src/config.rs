// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command line configuration for gotest-report
//!
//! This module defines the clap argument parser and converts the parsed
//! arguments into a library [`ReportConfig`].

use std::path::PathBuf;

use clap::Parser;
use gotest_report::config::{InputFormat, ReportConfig, SubtestMode, parse_property};

/// Convert go test output into a structured report
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gotest-report")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Read go test output from a file instead of stdin
    #[arg(long = "in", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Package name used when the output never names one
    ///
    /// Useful for output of a compiled test binary, which prints no
    /// package summary line.
    #[arg(long, env = "GOTEST_REPORT_PACKAGE_NAME")]
    pub package_name: Option<String>,

    /// Input format: gotest (plain or -v output) or gojson (go test -json)
    #[arg(long, env = "GOTEST_REPORT_PARSER", default_value = "gotest")]
    pub parser: InputFormat,

    /// How parent tests of subtests are reported
    ///
    /// ignore-parent-results reports every parent as passed, so only leaf
    /// tests count. exclude-parents leaves parents out of the report.
    #[arg(long, default_value = "default")]
    pub subtest_mode: SubtestMode,

    /// Hostname recorded in the report, defaults to this machine's name
    #[arg(long)]
    pub hostname: Option<String>,

    /// Add a report property, as key=value (repeatable)
    #[arg(short = 'p', long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Exit with status 1 when the report contains failures
    #[arg(long, default_value = "false")]
    pub set_exit_code: bool,

    /// Copy the input to stdout while it is parsed
    ///
    /// Requires --out so the report does not mix with the copied input.
    #[arg(long, default_value = "false", requires = "output")]
    pub iocopy: bool,

    /// Print every parsed event to stderr
    #[arg(long, default_value = "false")]
    pub print_events: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with the report.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// Library configuration for these arguments
    #[must_use]
    pub fn report_config(&self) -> ReportConfig {
        let mut config = ReportConfig::default()
            .with_format(self.parser)
            .with_subtest_mode(self.subtest_mode);
        config.package_name.clone_from(&self.package_name);
        config.hostname = self.hostname.clone().or_else(machine_hostname);
        config.properties = self.properties.iter().cloned().collect();
        config
    }
}

/// Name of the machine running the tool, if the OS reports a usable one
fn machine_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
}
