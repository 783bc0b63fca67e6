// Strongroom — Library root
//
// Re-exports the secret, store, property and CLI modules.

pub mod cli;
pub mod error;
pub mod property;
pub mod secret;
pub mod store;

pub use error::{Result, StrongroomError};
pub use store::{SecureStore, StoreError, StoreOptions};
