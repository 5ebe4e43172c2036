use std::io::{self, Write};
use std::path::Path;

use bytes::Bytes;
use tempfile::TempPath;

use crate::config::PreviewMode;

/// Retained copy of a leaf's bytes for the presentation layer.
///
/// Owned by exactly one [`LeafResult`](crate::LeafResult). Dropping the handle
/// releases the resource; [`revoke`](Self::revoke) does so eagerly and reports
/// failures.
#[derive(Debug, Default)]
pub enum PreviewHandle {
    #[default]
    Empty,
    Memory(Bytes),
    TempFile(TempPath),
}

impl PreviewHandle {
    /// Retain `payload` according to `mode`. `extension` names the temporary
    /// file's suffix so external viewers recognize the format.
    pub fn create(mode: PreviewMode, payload: Option<&Bytes>, extension: &str) -> io::Result<Self> {
        let Some(payload) = payload else {
            return Ok(Self::Empty);
        };
        match mode {
            PreviewMode::None => Ok(Self::Empty),
            PreviewMode::Memory => Ok(Self::Memory(payload.clone())),
            PreviewMode::TempFile => {
                let suffix = format!(".{extension}");
                let mut file = tempfile::Builder::new()
                    .prefix("lexa-preview-")
                    .suffix(&suffix)
                    .tempfile()?;
                file.write_all(payload)?;
                file.flush()?;
                Ok(Self::TempFile(file.into_temp_path()))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Memory(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::TempFile(path) => Some(&**path),
            _ => None,
        }
    }

    /// Release the retained bytes now.
    pub fn revoke(self) -> io::Result<()> {
        match self {
            Self::TempFile(path) => path.close(),
            Self::Memory(_) | Self::Empty => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Bytes {
        Bytes::from_static(b"%PDF-1.5 fake")
    }

    #[test]
    fn memory_handle_shares_payload() {
        let bytes = payload();
        let handle = PreviewHandle::create(PreviewMode::Memory, Some(&bytes), "pdf").unwrap();
        assert_eq!(handle.bytes(), Some(&bytes));
        assert!(handle.path().is_none());
    }

    #[test]
    fn no_payload_is_empty() {
        let handle = PreviewHandle::create(PreviewMode::TempFile, None, "pdf").unwrap();
        assert!(handle.is_empty());
        let handle = PreviewHandle::create(PreviewMode::None, Some(&payload()), "pdf").unwrap();
        assert!(handle.is_empty());
    }

    #[test]
    fn temp_file_is_removed_on_revoke() {
        let handle = PreviewHandle::create(PreviewMode::TempFile, Some(&payload()), "pdf").unwrap();
        let path = handle.path().unwrap().to_path_buf();
        assert_eq!(path.extension().unwrap(), "pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 fake");

        handle.revoke().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let handle = PreviewHandle::create(PreviewMode::TempFile, Some(&payload()), "bin").unwrap();
        let path = handle.path().unwrap().to_path_buf();
        drop(handle);
        assert!(!path.exists());
    }
}
