//! Counting pre-pass feeding file-based progress.
//!
//! The pre-pass walks the archive with the same limits as the real run but
//! its own budget, so the tally matches what the extraction walk will emit.
//! Leaf payloads are never read; nested containers still have to be decoded
//! to see inside them.

use std::ops::ControlFlow;

use bytes::Bytes;
use lexa_archive::{ArchivePath, BudgetTracker, ExtractionLimits, Leaf, Truncation, WalkMode, Walker};
use tracing::debug;

/// Leaf tallies of one archive under given limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Estimate {
    pub scorable: u64,
    pub unsupported: u64,
    pub truncation: Truncation,
}

impl Estimate {
    pub fn leaves(&self) -> u64 {
        self.scorable + self.unsupported
    }
}

/// Count the leaves of `data` without decoding any of them.
///
/// Fails only when the top-level container cannot be opened.
pub fn count_leaves(
    data: Bytes,
    root: &ArchivePath,
    limits: ExtractionLimits,
) -> lexa_archive::Result<Estimate> {
    let budget = BudgetTracker::new(&limits);
    let mut estimate = Estimate::default();

    let mut tally = |leaf: Leaf| {
        if leaf.is_scorable() {
            estimate.scorable += 1;
        } else {
            estimate.unsupported += 1;
        }
        ControlFlow::Continue(())
    };
    Walker::new(limits, &budget)
        .mode(WalkMode::Count)
        .walk_root(data, root, &mut tally)?;

    estimate.truncation = budget.truncation();
    debug!(
        archive = %root,
        scorable = estimate.scorable,
        unsupported = estimate.unsupported,
        truncated = estimate.truncation.is_truncated(),
        "counting pass finished"
    );
    Ok(estimate)
}
