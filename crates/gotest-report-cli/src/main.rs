// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gotest-report: convert go test output into a structured report

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use gotest_report_cli::config::Config;

fn main() -> ExitCode {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the report or the copied input
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    match gotest_report_cli::run(&config) {
        Ok(report) => ExitCode::from(gotest_report_cli::exit_code(&report, config.set_exit_code)),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}
