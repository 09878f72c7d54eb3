// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gotest-report

use thiserror::Error;

/// Errors that can occur while turning test output into a report
///
/// Content the parsers cannot make sense of is never an error; it becomes
/// plain output. Only reading the stream or interpreting configuration fails.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Error reading the input stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown subtest mode name
    #[error("Invalid subtest mode: {value} (expected ignore-parent-results or exclude-parents)")]
    InvalidSubtestMode {
        /// The rejected value
        value: String,
    },

    /// Unknown input format name
    #[error("Invalid input format: {value} (expected gotest or gojson)")]
    InvalidInputFormat {
        /// The rejected value
        value: String,
    },

    /// Property not given as `key=value`
    #[error("Invalid property: {value} is not specified as \"key=value\"")]
    InvalidProperty {
        /// The rejected value
        value: String,
    },
}
