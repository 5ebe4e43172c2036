use lexa_archive::{ArchivePath, CounterSnapshot, LeafKind, Truncation};
use serde::Serialize;

use crate::preview::PreviewHandle;

/// One emitted leaf of an import.
#[derive(Debug, Serialize)]
pub struct LeafResult {
    pub path: ArchivePath,
    pub display_name: String,
    pub kind: LeafKind,
    pub is_scorable: bool,
    pub size_bytes: u64,
    /// In `[0, 1]`. Absent when text could not be extracted or scoring failed.
    pub score: Option<f64>,
    #[serde(skip)]
    pub preview: PreviewHandle,
}

/// A subtree or entry left out because it could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub path: ArchivePath,
    pub reason: String,
}

/// Everything one import produced, in walk order.
#[derive(Debug, Default, Serialize)]
pub struct TraversalOutcome {
    pub leaves: Vec<LeafResult>,
    pub truncation: Truncation,
    pub counters: CounterSnapshot,
    pub skipped: Vec<SkippedEntry>,
}

impl TraversalOutcome {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_truncated()
    }

    pub fn scored(&self) -> impl Iterator<Item = &LeafResult> {
        self.leaves.iter().filter(|leaf| leaf.score.is_some())
    }

    pub fn find(&self, path: &ArchivePath) -> Option<&LeafResult> {
        self.leaves.iter().find(|leaf| &leaf.path == path)
    }
}

/// `report.pdf` numbered 3 becomes `report-3.pdf`.
pub fn display_name(file_name: &str, n: u64) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{file_name}-{n}"),
    }
}
