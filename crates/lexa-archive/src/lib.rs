//! Bounded recursive traversal of nested ZIP archives.
//!
//! # Architecture
//!
//! - `limits.rs` - Immutable depth/entry/byte ceilings
//! - `budget.rs` - Shared per-run counters and admission checks
//! - `path.rs` - Logical paths across container boundaries
//! - `entry.rs` - Entry classification and leaf records
//! - `detect.rs` - Container signature detection
//! - `walk/` - Deterministic recursive walker and the ZIP entry source

pub use budget::{BudgetTracker, CounterSnapshot, ResourceCounters, Truncation};
pub use entry::{DocumentKind, Leaf, LeafKind};
pub use error::{Error, Result};
pub use limits::ExtractionLimits;
pub use path::{ArchivePath, CONTAINER_MARK};
pub use walk::{LeafSink, WalkMode, Walker};

pub mod budget;
pub mod detect;
pub mod entry;
mod error;
pub mod limits;
pub mod path;
pub mod walk;
