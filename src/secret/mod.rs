// Strongroom — Secret Module
//
// Turns a caller secret plus a random salt into the symmetric key used by the
// secure store, and checks secrets against a pluggable strength policy.
// Derived keys live in zeroizing buffers and are never logged.

mod error;
mod kdf;
mod policy;

pub use error::SecretError;
pub use kdf::{derive_store_key, Argon2Deriver, Argon2Params, KeyDeriver, DERIVED_KEY_LEN, MAX_SECRET_LEN, MIN_SECRET_LEN};
pub use policy::{DefaultSecretPolicy, SecretPolicy, PUNCTUATION};
