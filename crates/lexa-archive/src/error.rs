use std::io;

use crate::path::ArchivePath;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("archive is corrupted: {source}")]
    Corrupted {
        #[source]
        source: zip::result::ZipError,
    },

    #[error("nested container '{path}' is corrupted: {source}")]
    NestedContainer {
        path: ArchivePath,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read entry '{path}': {source}")]
    EntryRead {
        path: ArchivePath,
        #[source]
        source: io::Error,
    },

    #[error("entry '{path}' decoded to more than its declared {declared} bytes")]
    SizeMismatch { path: ArchivePath, declared: u64 },
}

impl From<zip::result::ZipError> for Error {
    fn from(source: zip::result::ZipError) -> Self {
        Self::Corrupted { source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
