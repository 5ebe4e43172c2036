use std::fmt;

use lexa_archive::ArchivePath;

use crate::error::Error;
use crate::outcome::TraversalOutcome;

/// Lifecycle of one archive import.
///
/// Imports progress through these phases in order:
/// Idle → Counting → Extracting → Done | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Created, nothing read yet.
    #[default]
    Idle,

    /// Pre-pass tallying the scorable leaves.
    Counting,

    /// Decoding, extracting and scoring leaves in walk order.
    Extracting,

    /// Terminal state. Individual scoring failures do not prevent it.
    Done,

    /// Terminal state for an unopenable archive or a cancelled import.
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Counting => write!(f, "Counting"),
            Phase::Extracting => write!(f, "Extracting"),
            Phase::Done => write!(f, "Done"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

/// One step of an import as observed by a consumer of [`ImportRun`](crate::ImportRun).
#[derive(Debug)]
pub enum PipelineEvent {
    Phase(Phase),
    /// Whole percent. Never decreases; 100 only once the import is done.
    Progress(u8),
    /// A result was assembled, in walk order.
    Leaf {
        path: ArchivePath,
        display_name: String,
        score: Option<f64>,
    },
    /// Last event of every import.
    Finished(Result<TraversalOutcome, Error>),
}

/// File-count based progress over the scorable leaves of one import.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ProgressMeter {
    total: u64,
    processed: u64,
    last: u8,
}

impl ProgressMeter {
    pub(crate) const CEILING: u8 = 99;
    pub(crate) const COMPLETE: u8 = 100;

    pub(crate) fn new(total: u64) -> Self {
        Self {
            total,
            processed: 0,
            last: 0,
        }
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Record one processed scorable leaf. Returns the new percentage when
    /// it moved.
    pub(crate) fn advance(&mut self) -> Option<u8> {
        self.processed += 1;
        if self.total == 0 {
            return None;
        }
        let pct = (self.processed.saturating_mul(100) / self.total).min(u64::from(Self::CEILING)) as u8;
        if pct > self.last {
            self.last = pct;
            Some(pct)
        } else {
            None
        }
    }

    pub(crate) fn last(&self) -> u8 {
        self.last
    }
}
