// Strongroom — Property error types

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("Property '{0}' is not registered")]
    Unregistered(String),

    #[error("Property '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Codec '{codec}' cannot encode this value: expected {expected}")]
    Mismatch {
        codec: &'static str,
        expected: &'static str,
    },

    #[error("Stored value is not a valid {codec}: {reason}")]
    Malformed { codec: &'static str, reason: String },

    #[error("Invalid entity name: {0}")]
    InvalidEntity(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
