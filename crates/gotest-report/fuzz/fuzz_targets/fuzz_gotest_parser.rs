// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the go test text parser
//!
//! Any byte stream must produce a report; invalid UTF-8 is replaced.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gotest_report::ReportConfig;

fuzz_target!(|data: &[u8]| {
    let _ = ReportConfig::default().run(data);
});
