//! Container signature detection.

/// Local file header signature.
const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// End of central directory signature, the first bytes of an empty archive.
const ZIP_EMPTY: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
/// Spanned archive marker.
const ZIP_SPANNED: [u8; 4] = [0x50, 0x4B, 0x07, 0x08];

/// Whether `data` starts like a ZIP container.
pub fn is_zip(data: &[u8]) -> bool {
    matches!(
        data.get(..4),
        Some(head) if head == ZIP_LOCAL_HEADER || head == ZIP_EMPTY || head == ZIP_SPANNED
    )
}
