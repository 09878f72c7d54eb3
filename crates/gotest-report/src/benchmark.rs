// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Benchmark statistics and grouping of repeated benchmark runs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::Outcome;
use crate::report::{Test, TestData};

/// Statistics from a single benchmark result line
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Iteration count
    pub iterations: i64,
    /// Nanoseconds per operation
    pub ns_per_op: f64,
    /// Throughput in MB/s
    pub mb_per_sec: f64,
    /// Bytes allocated per operation
    pub bytes_per_op: i64,
    /// Allocations per operation
    pub allocs_per_op: i64,
}

impl Benchmark {
    /// Arithmetic mean of several results
    ///
    /// Integer fields are truncated. Returns `None` for an empty slice.
    #[must_use]
    pub fn mean(samples: &[Self]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let total = samples.iter().fold(Self::default(), |acc, b| Self {
            iterations: acc.iterations + b.iterations,
            ns_per_op: acc.ns_per_op + b.ns_per_op,
            mb_per_sec: acc.mb_per_sec + b.mb_per_sec,
            bytes_per_op: acc.bytes_per_op + b.bytes_per_op,
            allocs_per_op: acc.allocs_per_op + b.allocs_per_op,
        });
        Some(Self {
            iterations: total.iterations / count as i64,
            ns_per_op: total.ns_per_op / count as f64,
            mb_per_sec: total.mb_per_sec / count as f64,
            bytes_per_op: total.bytes_per_op / count as i64,
            allocs_per_op: total.allocs_per_op / count as i64,
        })
    }
}

/// Combined outcome of repeated runs of one benchmark
///
/// Fail if any run failed, otherwise the shared outcome if all runs agree,
/// otherwise Unknown.
#[must_use]
pub fn group_outcome(outcomes: impl IntoIterator<Item = Outcome>) -> Outcome {
    let mut combined = None;
    for outcome in outcomes {
        if outcome == Outcome::Fail {
            return Outcome::Fail;
        }
        combined = match combined {
            None => Some(outcome),
            Some(prev) if prev == outcome => Some(prev),
            Some(_) => Some(Outcome::Unknown),
        };
    }
    combined.unwrap_or_default()
}

/// Merge benchmarks that share a name into a single test
///
/// Non-benchmark tests pass through untouched. Each group keeps the position
/// and ID of its first occurrence; its statistics are the mean over all
/// occurrences carrying statistics, its duration the sum, and its output the
/// concatenation of all occurrences in order.
#[must_use]
pub fn group_by_name(tests: Vec<Test>) -> Vec<Test> {
    let mut grouped: Vec<Test> = Vec::with_capacity(tests.len());
    let mut members: HashMap<String, Vec<Test>> = HashMap::new();

    for test in tests {
        if !test.is_benchmark() {
            grouped.push(test);
            continue;
        }
        if !members.contains_key(&test.name) {
            let mut head = Test::new(test.id, test.name.clone());
            head.classname.clone_from(&test.classname);
            head.level = test.level;
            grouped.push(head);
        }
        members.entry(test.name.clone()).or_default().push(test);
    }

    for group in &mut grouped {
        let Some(runs) = members.remove(&group.name) else {
            continue;
        };
        let stats: Vec<Benchmark> = runs.iter().filter_map(|t| t.benchmark().copied()).collect();
        group.outcome = group_outcome(runs.iter().map(|t| t.outcome));
        group.duration = runs.iter().map(|t| t.duration).sum();
        group.output = runs.into_iter().flat_map(|t| t.output).collect();
        if let Some(mean) = Benchmark::mean(&stats) {
            group.data = TestData::Benchmark(mean);
        }
    }

    grouped
}
