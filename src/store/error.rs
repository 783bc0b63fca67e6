// Strongroom — Store error types

use thiserror::Error;

use crate::secret::SecretError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    #[error("Secret is too weak: {0}")]
    WeakSecret(String),

    #[error("Key not found")]
    KeyNotFound,

    #[error("Store is not genuine: {0}")]
    NotGenuine(String),

    #[error("Codec failure: {0}")]
    Codec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SecretError> for StoreError {
    fn from(err: SecretError) -> Self {
        match err {
            SecretError::Invalid(reason) => StoreError::InvalidSecret(reason),
            SecretError::Weak(reason) => StoreError::WeakSecret(reason),
            SecretError::Derivation(reason) => StoreError::Codec(reason),
        }
    }
}
