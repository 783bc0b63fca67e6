// Strongroom — Store Module
//
// Encrypted key-value storage. Keys and values are AES-CBC encrypted under a
// key derived from the caller's secret; the persisted file is HMAC-signed so
// tampering and wrong secrets are detected on load.

mod codec;
mod error;
mod options;
mod persist;
mod secure_store;
mod tokens;

pub use codec::{extract_value, BlockCodec, IvMode, BLOCK_SIZE};
pub use error::StoreError;
pub use options::{StoreOptions, DEFAULT_WRITE_ATTEMPTS};
pub use persist::StoreFile;
pub use secure_store::{SecureStore, SALT_LEN};
pub use tokens::index_token;
