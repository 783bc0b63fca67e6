// Strongroom — Lookup tokens
//
// Each logical key owns two rows in the entry map:
//   index token (base64 SHA-256 of the key) → key seed
//   entry token (key encrypted with an IV built from the seed) → encrypted value
// Neither token reveals the key; the index token only lets a caller holding
// the key find its seed without decrypting anything.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};

use super::codec::{BlockCodec, IvMode};
use super::StoreError;

/// Random bytes per key seed; base64-encodes to exactly one IV block (16 chars).
pub const KEY_SEED_LEN: usize = 12;

/// Deterministic, key-free lookup handle for `key`.
pub fn index_token(key: &str) -> String {
    STANDARD.encode(Sha256::digest(key.as_bytes()))
}

/// A fresh per-key seed.
pub fn new_key_seed() -> Result<String, StoreError> {
    let mut seed = [0u8; KEY_SEED_LEN];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|e| StoreError::Codec(format!("randomness unavailable: {}", e)))?;
    Ok(STANDARD.encode(seed))
}

/// The entry token for `key` under `seed`; stable for a given seed.
pub fn entry_token(codec: &BlockCodec, key: &str, seed: &str) -> Result<String, StoreError> {
    codec.encrypt(key.as_bytes(), IvMode::Seeded(seed))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
