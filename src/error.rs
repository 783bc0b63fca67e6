// Strongroom — Top-level error types
//
// Aggregates errors from the secret, store and property modules into a
// single error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all Strongroom operations.
#[derive(Debug, Error)]
pub enum StrongroomError {
    #[error("Secret error: {0}")]
    Secret(#[from] crate::secret::SecretError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Property error: {0}")]
    Property(#[from] crate::property::PropertyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StrongroomError>;
