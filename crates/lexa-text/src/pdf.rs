use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use crate::error::{ExtractionError, Result};
use crate::normalize::NormalizedText;

/// Extract page text in page order, one newline between pages.
///
/// A page whose content stream cannot be decoded contributes no text; a
/// document that cannot be opened at all is an error.
pub fn extract(bytes: &[u8]) -> Result<NormalizedText> {
    // lopdf can panic on hostile content streams
    panic::catch_unwind(AssertUnwindSafe(|| extract_pages(bytes)))
        .map_err(|_| ExtractionError::Panicked)?
}

fn extract_pages(bytes: &[u8]) -> Result<NormalizedText> {
    let doc = Document::load_mem(bytes).map_err(ExtractionError::Parse)?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ExtractionError::Encrypted);
    }

    let pages = doc.get_pages();
    let mut units = Vec::with_capacity(pages.len());
    for &number in pages.keys() {
        match doc.extract_text(&[number]) {
            Ok(text) => units.push(text),
            Err(e) => warn!(page = number, error = %e, "page text unreadable, skipped"),
        }
    }

    let text = NormalizedText::from_units(units);
    debug!(pages = pages.len(), chars = text.as_str().len(), "pdf text extracted");
    Ok(text)
}
