use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document could not be parsed: {0}")]
    Parse(#[source] lopdf::Error),

    #[error("document is encrypted")]
    Encrypted,

    #[error("document parser panicked (malformed document)")]
    Panicked,
}

pub type Result<T> = std::result::Result<T, ExtractionError>;
