//! Error types for the carlot library

use crate::entities::{MediaId, RecordId, TaxonomyCategory, TermId};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Term '{name}' already exists in {category} as {existing}")]
    TermExists {
        category: TaxonomyCategory,
        name: String,
        existing: TermId,
    },

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Media not found: {0}")]
    MediaNotFound(MediaId),

    #[error("Content, title, and excerpt are empty")]
    EmptyTitle,

    #[error("Sorry, this file type is not permitted: {0}")]
    UnsupportedMediaType(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from rendering the entry form or the listing
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Anti-forgery token errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is missing")]
    Missing,

    #[error("Token does not match purpose '{0}'")]
    Mismatch(String),
}

/// Classification of a failed submission
///
/// Only `DuplicateName` is shown next to a specific field; everything else is
/// a form-level message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionErrorKind {
    InvalidToken,
    MissingFields,
    DuplicateName,
    InsertFailed,
    UploadFailed,
}

/// A terminal, user-facing submission failure
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Nonce verification failed.")]
    InvalidToken(#[source] TokenError),

    #[error("Missing fields.")]
    MissingFields { fields: Vec<&'static str> },

    #[error("Car name already exists.")]
    DuplicateName(String),

    #[error("Failed to add car.")]
    InsertFailed(#[source] StoreError),

    #[error("Failed to upload image: {0}")]
    UploadFailed(#[source] StoreError),
}

impl SubmissionError {
    pub fn kind(&self) -> SubmissionErrorKind {
        match self {
            SubmissionError::InvalidToken(_) => SubmissionErrorKind::InvalidToken,
            SubmissionError::MissingFields { .. } => SubmissionErrorKind::MissingFields,
            SubmissionError::DuplicateName(_) => SubmissionErrorKind::DuplicateName,
            SubmissionError::InsertFailed(_) => SubmissionErrorKind::InsertFailed,
            SubmissionError::UploadFailed(_) => SubmissionErrorKind::UploadFailed,
        }
    }

    /// Form field the message belongs to, if it is field-specific
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SubmissionError::DuplicateName(_) => Some("carName"),
            _ => None,
        }
    }
}

/// Errors from the submission pipeline
///
/// `Rejected` is an expected outcome reported back to the visitor; `Store`
/// means a backend failed somewhere the workflow does not classify.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Rejected(#[from] SubmissionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
