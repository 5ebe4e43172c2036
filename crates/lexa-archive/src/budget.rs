//! Per-run resource accounting for archive traversal.
//!
//! # Invariants
//! - Counters only grow within a run; a new run builds a new tracker.
//! - A refused admission latches the tracker: every later admission fails,
//!   so exhaustion propagates outward through all enclosing containers.
//! - All updates are atomic, so leaf tasks running concurrently may share
//!   one tracker by reference.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;

use crate::limits::ExtractionLimits;

/// Mutable counters for one traversal run.
#[derive(Debug, Default)]
pub struct ResourceCounters {
    entries_visited: AtomicU64,
    bytes_decoded: AtomicU64,
    leaves_processed: AtomicU64,
}

/// Point-in-time copy of [`ResourceCounters`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub entries_visited: u64,
    pub bytes_decoded: u64,
    pub leaves_processed: u64,
}

impl ResourceCounters {
    pub fn entries_visited(&self) -> u64 {
        self.entries_visited.load(Ordering::Acquire)
    }

    pub fn bytes_decoded(&self) -> u64 {
        self.bytes_decoded.load(Ordering::Acquire)
    }

    pub fn leaves_processed(&self) -> u64 {
        self.leaves_processed.load(Ordering::Acquire)
    }

    /// Record one fully processed leaf, returning the new total.
    pub fn record_leaf_processed(&self) -> u64 {
        self.leaves_processed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            entries_visited: self.entries_visited(),
            bytes_decoded: self.bytes_decoded(),
            leaves_processed: self.leaves_processed(),
        }
    }
}

/// Which ceilings stopped the traversal early.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Truncation {
    pub entry_limit: bool,
    pub byte_limit: bool,
}

impl Truncation {
    pub fn is_truncated(&self) -> bool {
        self.entry_limit || self.byte_limit
    }
}

/// Admission control over [`ResourceCounters`] for one run.
#[derive(Debug)]
pub struct BudgetTracker {
    max_entries: u64,
    max_total_bytes: u64,
    counters: ResourceCounters,
    entry_limit_hit: AtomicBool,
    byte_limit_hit: AtomicBool,
}

impl BudgetTracker {
    pub fn new(limits: &ExtractionLimits) -> Self {
        Self {
            max_entries: limits.max_entries,
            max_total_bytes: limits.max_total_bytes,
            counters: ResourceCounters::default(),
            entry_limit_hit: AtomicBool::new(false),
            byte_limit_hit: AtomicBool::new(false),
        }
    }

    pub fn counters(&self) -> &ResourceCounters {
        &self.counters
    }

    /// Admit one more leaf entry. Checked before any decode work.
    pub fn try_admit_entry(&self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        let max = self.max_entries;
        let admitted = self
            .counters
            .entries_visited
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .is_ok();
        if !admitted {
            self.entry_limit_hit.store(true, Ordering::Release);
        }
        admitted
    }

    /// Commit `bytes` more decoded bytes if the cumulative total stays within
    /// the ceiling.
    pub fn try_admit(&self, bytes: u64) -> bool {
        if self.is_exhausted() {
            return false;
        }
        let max = self.max_total_bytes;
        let admitted = self
            .counters
            .bytes_decoded
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |total| {
                total.checked_add(bytes).filter(|next| *next <= max)
            })
            .is_ok();
        if !admitted {
            self.byte_limit_hit.store(true, Ordering::Release);
        }
        admitted
    }

    pub fn is_exhausted(&self) -> bool {
        self.entry_limit_hit.load(Ordering::Acquire) || self.byte_limit_hit.load(Ordering::Acquire)
    }

    pub fn truncation(&self) -> Truncation {
        Truncation {
            entry_limit: self.entry_limit_hit.load(Ordering::Acquire),
            byte_limit: self.byte_limit_hit.load(Ordering::Acquire),
        }
    }
}
