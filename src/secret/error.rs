// Strongroom — Secret error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Invalid secret: {0}")]
    Invalid(String),

    #[error("Secret is too weak: {0}")]
    Weak(String),

    #[error("Key derivation error: {0}")]
    Derivation(String),
}
