// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Output collection and ID allocation for the report builder

use std::collections::HashMap;

/// Identifier of a test or pending build error within one run
pub type TestId = usize;

/// Slot holding output that belongs to the package rather than a test
pub const PACKAGE_SLOT: TestId = 0;

/// Hands out increasing IDs, never reusing one within a run
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: TestId,
}

impl IdAllocator {
    /// Create an allocator whose first ID is 1
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: PACKAGE_SLOT + 1,
        }
    }

    /// Allocate the next ID
    pub fn allocate(&mut self) -> TestId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Output lines collected per ID
#[derive(Debug, Clone, Default)]
pub struct OutputCollector {
    lines: HashMap<TestId, Vec<String>>,
}

impl OutputCollector {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the given slot
    pub fn append(&mut self, id: TestId, line: impl Into<String>) {
        self.lines.entry(id).or_default().push(line.into());
    }

    /// Check if a slot holds any output
    #[must_use]
    pub fn contains(&self, id: TestId) -> bool {
        self.lines.get(&id).is_some_and(|l| !l.is_empty())
    }

    /// Remove and return the output of a slot
    pub fn take(&mut self, id: TestId) -> Vec<String> {
        self.lines.remove(&id).unwrap_or_default()
    }

    /// Move the output of one slot to the end of another
    pub fn merge(&mut self, from: TestId, into: TestId) {
        let moved = self.take(from);
        if !moved.is_empty() {
            self.lines.entry(into).or_default().extend(moved);
        }
    }
}
