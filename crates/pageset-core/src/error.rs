use thiserror::Error;

/// Failure taxonomy for page-set transforms.
///
/// A request either fully succeeds or fails with exactly one of these;
/// no partial output is ever returned.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Selection contains no valid pages")]
    NoValidPages,

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Page copy failed: {0}")]
    Copy(String),

    #[error("Serialization failed: {0}")]
    Serialize(String),

    #[error("Archive packaging failed: {0}")]
    Packaging(String),
}
