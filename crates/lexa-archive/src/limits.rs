use serde::{Deserialize, Serialize};

/// Ceilings bounding one traversal run.
///
/// Fixed for the lifetime of a run. Hitting any of them stops further
/// enumeration; entries already accepted are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    /// Deepest container level processed. The top-level container is depth 1.
    pub max_depth: u32,
    /// Maximum number of leaf entries admitted across the whole run.
    pub max_entries: u64,
    /// Maximum cumulative decoded bytes across the whole run.
    pub max_total_bytes: u64,
}

impl ExtractionLimits {
    pub const DEFAULT_MAX_DEPTH: u32 = 5;
    pub const DEFAULT_MAX_ENTRIES: u64 = 3000;
    pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 300 * 1024 * 1024;

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_entries(mut self, entries: u64) -> Self {
        self.max_entries = entries;
        self
    }

    pub fn max_total_bytes(mut self, bytes: u64) -> Self {
        self.max_total_bytes = bytes;
        self
    }

    /// Whether a container opened at `depth` may be traversed.
    pub fn allows_depth(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            max_total_bytes: Self::DEFAULT_MAX_TOTAL_BYTES,
        }
    }
}
