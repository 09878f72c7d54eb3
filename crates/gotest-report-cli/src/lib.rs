// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gotest-report command line tool
//!
//! This crate wires the [`gotest_report`] library to files, stdin and stdout.
//! It is exposed as a library for integration tests.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use anyhow::{Context, Result};
use gotest_report::Report;
use tracing::{debug, info};

pub mod config;

use config::Config;

/// Reader that copies everything it reads to a second writer
struct Tee<'a, R> {
    inner: R,
    copy: Option<&'a mut dyn Write>,
}

impl<R: Read> Read for Tee<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let Some(copy) = self.copy.as_mut() {
            copy.write_all(&buf[..n])?;
        }
        Ok(n)
    }
}

/// Parse `input` into a report, copying the raw input to `copy` if given
///
/// # Errors
///
/// Returns an error if reading the input or writing the copy fails.
pub fn build_report<R: Read>(
    config: &Config,
    input: R,
    copy: Option<&mut dyn Write>,
) -> Result<Report> {
    let reader = BufReader::new(Tee { inner: input, copy });
    let report_config = config.report_config();
    let report = report_config
        .run_with(reader, |event| {
            if config.print_events {
                eprintln!("{event}");
            }
        })
        .context("Failed to read test output")?;
    info!(
        packages = report.packages.len(),
        tests = report.tests(),
        failures = report.failures(),
        skipped = report.skipped(),
        "Report built"
    );
    Ok(report)
}

/// Write the report as pretty-printed JSON
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report<W: Write>(report: &Report, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report).context("Failed to write report")?;
    writeln!(out).context("Failed to write report")?;
    out.flush().context("Failed to flush report")?;
    Ok(())
}

/// Exit status for a finished report
#[must_use]
pub fn exit_code(report: &Report, set_exit_code: bool) -> u8 {
    if set_exit_code && report.failures() > 0 {
        1
    } else {
        0
    }
}

/// Run the tool: read the input, build the report and write it out
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// written.
pub fn run(config: &Config) -> Result<Report> {
    let input: Box<dyn Read> = match &config.input {
        Some(path) => {
            debug!(path = %path.display(), "Reading test output from file");
            Box::new(
                File::open(path)
                    .with_context(|| format!("Failed to open input file {}", path.display()))?,
            )
        }
        None => Box::new(io::stdin().lock()),
    };

    let report = if config.iocopy {
        let mut stdout = io::stdout().lock();
        build_report(config, input, Some(&mut stdout))?
    } else {
        build_report(config, input, None)?
    };

    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            write_report(&report, BufWriter::new(file))?;
            debug!(path = %path.display(), "Report written");
        }
        None => write_report(&report, io::stdout().lock())?,
    }
    Ok(report)
}
