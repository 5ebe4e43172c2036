//! Extract-and-score pipeline over nested archives.
//!
//! # Architecture
//!
//! - [`estimate`] - Counting pre-pass sizing the progress scale
//! - [`pipeline`] - Budgeted walk, concurrent extraction and scoring, events
//! - [`preview`] - RAII handles on retained leaf bytes
//! - [`session`] - Result set ownership, annotations and export
//! - [`present`] - Formatting, filtering and ordering of results
//!
//! An import moves through [`Phase`]s and reports them, along with
//! progress and each assembled result, as [`PipelineEvent`]s. Only an
//! unopenable top-level archive fails an import; every other problem is
//! visible as a missing score, a skipped subtree or a truncation flag.

pub use config::{Capabilities, PipelineConfig, PreviewMode};
pub use error::{Capability, Error, Result};
pub use estimate::{Estimate, count_leaves};
pub use event::{Phase, PipelineEvent};
pub use outcome::{LeafResult, SkippedEntry, TraversalOutcome, display_name};
pub use pipeline::{ArchiveInput, ImportRun, Pipeline};
pub use present::{ResultView, RiskLevel, SortKey, SortOrder, format_score, format_size};
pub use preview::PreviewHandle;
pub use session::ResultSet;

pub mod config;
mod error;
pub mod estimate;
mod event;
mod outcome;
pub mod pipeline;
pub mod present;
pub mod preview;
pub mod session;
