use bytes::Bytes;
use serde::Serialize;

use crate::path::ArchivePath;

/// Document formats whose text can be extracted and scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
}

impl DocumentKind {
    /// Classify an entry by its name suffix (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        if has_suffix(name, ".pdf") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
        }
    }
}

/// Whether an entry name designates a nested container.
pub fn is_container_name(name: &str) -> bool {
    has_suffix(name, ".zip")
}

fn has_suffix(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name
            .get(name.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LeafKind {
    Document(DocumentKind),
    Unsupported,
}

impl LeafKind {
    pub fn from_name(name: &str) -> Self {
        DocumentKind::from_name(name).map_or(Self::Unsupported, Self::Document)
    }

    pub fn is_scorable(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    pub fn document(&self) -> Option<DocumentKind> {
        match self {
            Self::Document(kind) => Some(*kind),
            Self::Unsupported => None,
        }
    }
}

/// A non-container entry handed to a [`LeafSink`](crate::LeafSink).
#[derive(Clone, Debug)]
pub struct Leaf {
    pub path: ArchivePath,
    pub kind: LeafKind,
    pub size: u64,
    /// Decoded bytes. `None` when walking in counting mode.
    pub payload: Option<Bytes>,
}

impl Leaf {
    pub fn is_scorable(&self) -> bool {
        self.kind.is_scorable()
    }
}
