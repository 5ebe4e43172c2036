//! Plain-text extraction for documents found inside archives.
//!
//! - `pdf.rs` - Page-ordered PDF text extraction
//! - `normalize.rs` - Whitespace normalization and the plus-encoded wire form

use lexa_archive::DocumentKind;

pub use error::{ExtractionError, Result};
pub use normalize::{NormalizedText, PlusEncodedText};

mod error;
pub mod normalize;
pub mod pdf;

/// Extract normalized text from a document of the given kind.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<NormalizedText> {
    match kind {
        DocumentKind::Pdf => pdf::extract(bytes),
    }
}
