// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the go test -json parser
//!
//! Malformed records must degrade to output, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gotest_report::{InputFormat, ReportConfig};

fuzz_target!(|data: &[u8]| {
    let _ = ReportConfig::default()
        .with_format(InputFormat::GoJson)
        .run(data);
});
