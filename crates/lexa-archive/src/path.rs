use std::fmt;

use serde::{Serialize, Serializer};

/// Marker placed between a container name and the entries inside it.
pub const CONTAINER_MARK: &str = "!/";

/// Logical location of an entry across nested containers.
///
/// Each segment is an entry name within one container level; the first
/// segment is the top-level archive's display name. `outer.zip`, `inner.zip`,
/// `doc.pdf` displays as `outer.zip!/inner.zip!/doc.pdf`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchivePath {
    segments: Vec<String>,
}

impl ArchivePath {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Path of `name` inside the container this path points at.
    pub fn join(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final component of the innermost entry name, without directories.
    pub fn file_name(&self) -> &str {
        let last = self.segments.last().map(String::as_str).unwrap_or_default();
        last.rsplit('/').next().unwrap_or(last)
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(CONTAINER_MARK)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl Serialize for ArchivePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
