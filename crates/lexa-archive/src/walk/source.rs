use std::io::{Read, Seek};

use bytes::Bytes;
use tracing::warn;

use crate::error::{Error, Result};
use crate::path::ArchivePath;

/// Central-directory metadata for one entry, read without decompressing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMeta {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

pub struct ZipSource<R: Read + Seek> {
    archive: ::zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ::zip::ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Entries in lexicographic name order.
    ///
    /// Headers that cannot be read are dropped, and a repeated name keeps only
    /// its first occurrence so logical paths stay unique.
    pub fn listing(&mut self, container: &ArchivePath) -> Vec<EntryMeta> {
        let mut listing = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            match self.archive.by_index_raw(index) {
                Ok(file) => listing.push(EntryMeta {
                    index,
                    name: file.name().to_string(),
                    size: file.size(),
                    is_dir: file.is_dir(),
                }),
                Err(e) => warn!(container = %container, index, error = %e, "skipping unreadable entry header"),
            }
        }

        listing.sort_by(|a, b| a.name.cmp(&b.name));
        listing.dedup_by(|later, first| later.name == first.name);
        listing
    }

    /// Decode one entry, refusing payloads longer than the declared size.
    pub fn read(&mut self, meta: &EntryMeta, path: &ArchivePath) -> Result<Bytes> {
        let file = self.archive.by_index(meta.index)?;
        let mut buf = Vec::with_capacity(usize::try_from(meta.size).unwrap_or(0));

        file.take(meta.size.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|source| Error::EntryRead {
                path: path.clone(),
                source,
            })?;

        if buf.len() as u64 > meta.size {
            return Err(Error::SizeMismatch {
                path: path.clone(),
                declared: meta.size,
            });
        }

        Ok(Bytes::from(buf))
    }
}
