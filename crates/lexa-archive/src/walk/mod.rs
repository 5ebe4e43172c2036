//! Deterministic recursive walk over nested containers.
//!
//! Entries of every container are visited in lexicographic name order, so
//! two walks over the same bytes and limits hand identical leaves to the sink
//! in identical order.

use std::io::{Cursor, Read, Seek};
use std::ops::ControlFlow;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::budget::BudgetTracker;
use crate::detect;
use crate::entry::{Leaf, LeafKind, is_container_name};
use crate::error::{Error, Result};
use crate::limits::ExtractionLimits;
use crate::path::ArchivePath;

mod source;

pub use source::{EntryMeta, ZipSource};

/// Whether leaf payloads are decoded or only accounted for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkMode {
    #[default]
    Decode,
    /// Leaves are admitted against the budget but never decompressed.
    Count,
}

/// Receiver of leaves in walk order.
///
/// Returning [`ControlFlow::Break`] stops the whole walk, including all
/// enclosing containers.
pub trait LeafSink {
    fn accept(&mut self, leaf: Leaf) -> ControlFlow<()>;

    /// Called for every entry dropped because it could not be decoded.
    fn skipped(&mut self, _path: &ArchivePath, _reason: &Error) {}
}

impl<F> LeafSink for F
where
    F: FnMut(Leaf) -> ControlFlow<()>,
{
    fn accept(&mut self, leaf: Leaf) -> ControlFlow<()> {
        self(leaf)
    }
}

pub struct Walker<'a> {
    limits: ExtractionLimits,
    budget: &'a BudgetTracker,
    mode: WalkMode,
}

impl<'a> Walker<'a> {
    pub fn new(limits: ExtractionLimits, budget: &'a BudgetTracker) -> Self {
        Self {
            limits,
            budget,
            mode: WalkMode::default(),
        }
    }

    pub fn mode(mut self, mode: WalkMode) -> Self {
        self.mode = mode;
        self
    }

    /// Open the top-level container and walk it at depth 1.
    ///
    /// Failing to open the top-level container is the only error returned;
    /// everything below it is isolated per entry.
    pub fn walk_root<S: LeafSink>(
        &self,
        data: Bytes,
        root: &ArchivePath,
        sink: &mut S,
    ) -> Result<ControlFlow<()>> {
        if !detect::is_zip(&data) {
            return Err(Error::UnsupportedFormat);
        }
        let mut source = ZipSource::new(Cursor::new(data))?;
        Ok(self.walk(&mut source, root, 1, sink))
    }

    /// Walk one opened container whose entries live under `base` at `depth`.
    pub fn walk<R: Read + Seek, S: LeafSink>(
        &self,
        source: &mut ZipSource<R>,
        base: &ArchivePath,
        depth: u32,
        sink: &mut S,
    ) -> ControlFlow<()> {
        if !self.limits.allows_depth(depth) {
            return ControlFlow::Continue(());
        }

        for meta in source.listing(base) {
            if meta.is_dir {
                continue;
            }
            if self.budget.is_exhausted() {
                debug!(container = %base, "budget exhausted, stopping enumeration");
                break;
            }

            let path = base.join(meta.name.as_str());
            if is_container_name(&meta.name) {
                self.visit_container(source, &meta, path, depth, sink)?;
            } else {
                self.visit_leaf(source, &meta, path, sink)?;
            }
        }

        ControlFlow::Continue(())
    }

    fn visit_container<R: Read + Seek, S: LeafSink>(
        &self,
        source: &mut ZipSource<R>,
        meta: &EntryMeta,
        path: ArchivePath,
        depth: u32,
        sink: &mut S,
    ) -> ControlFlow<()> {
        let nested_depth = depth + 1;
        if !self.limits.allows_depth(nested_depth) {
            debug!(path = %path, depth = nested_depth, "nested container beyond max depth");
            return ControlFlow::Continue(());
        }
        // A full entry budget is only a limit hit once a leaf inside is refused.
        if !self.budget.try_admit(meta.size) {
            return ControlFlow::Continue(());
        }

        let data = match source.read(meta, &path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path, error = %e, "nested container unreadable, subtree skipped");
                sink.skipped(&path, &e);
                return ControlFlow::Continue(());
            }
        };

        match ZipSource::new(Cursor::new(data)) {
            Ok(mut nested) => {
                debug!(path = %path, depth = nested_depth, entries = nested.len(), "entering nested container");
                self.walk(&mut nested, &path, nested_depth, sink)
            }
            Err(Error::Corrupted { source }) => {
                let e = Error::NestedContainer {
                    path: path.clone(),
                    source,
                };
                warn!(error = %e, "subtree skipped");
                sink.skipped(&path, &e);
                ControlFlow::Continue(())
            }
            Err(e) => {
                warn!(path = %path, error = %e, "subtree skipped");
                sink.skipped(&path, &e);
                ControlFlow::Continue(())
            }
        }
    }

    fn visit_leaf<R: Read + Seek, S: LeafSink>(
        &self,
        source: &mut ZipSource<R>,
        meta: &EntryMeta,
        path: ArchivePath,
        sink: &mut S,
    ) -> ControlFlow<()> {
        if !self.budget.try_admit_entry() || !self.budget.try_admit(meta.size) {
            return ControlFlow::Continue(());
        }

        let kind = LeafKind::from_name(&meta.name);
        let payload = match self.mode {
            WalkMode::Count => None,
            WalkMode::Decode => match source.read(meta, &path) {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!(path = %path, error = %e, "entry unreadable, skipped");
                    sink.skipped(&path, &e);
                    return ControlFlow::Continue(());
                }
            },
        };

        sink.accept(Leaf {
            path,
            kind,
            size: meta.size,
            payload,
        })
    }
}
