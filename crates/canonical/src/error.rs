use thiserror::Error;

/// Errors that can occur while extracting features from a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("document requires a non-empty id")]
    MissingDocId,
    #[error("document {id} has an empty title")]
    MissingTitle { id: String },
}
