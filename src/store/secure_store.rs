// Strongroom — Secure Store
//
// Encrypted key-value map with a searchable token index. Callers supply
// plaintext keys and values; the in-memory map (and the file it persists to)
// only ever holds index tokens, key seeds, entry tokens and ciphertext.
//
// Flow:
//   1. `new()` / `load()` — derive the store key from the caller secret + salt
//   2. `add()` / `get()` / `remove()` — index token → seed → entry token → value
//   3. `store()` — sign the entries with HMAC and write them atomically
//
// All operations on one instance are serialized by a per-instance mutex.
// The derived key is written once at construction and only read afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::OsRng;
use rand::TryRngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::secret::{derive_store_key, KeyDeriver};

use super::codec::{extract_value, BlockCodec, IvMode};
use super::options::StoreOptions;
use super::persist::{sign_entries, verify_entries, write_atomic, StoreFile};
use super::tokens::{entry_token, index_token, new_key_seed};
use super::StoreError;

/// Length of the random KDF salt in bytes.
pub const SALT_LEN: usize = 8;

/// Mutable part of the store, guarded by the instance lock.
#[derive(Default)]
struct StoreState {
    signature: Vec<u8>,
    entries: BTreeMap<String, String>,
}

pub struct SecureStore {
    salt: Vec<u8>,
    codec: BlockCodec,
    deriver: Arc<dyn KeyDeriver>,
    write_attempts: usize,
    state: Mutex<StoreState>,
}

impl SecureStore {
    /// Create an empty store protected by `secret`, using default options.
    pub fn new(secret: &str, enforce_strength: bool) -> Result<Self, StoreError> {
        Self::with_options(
            secret,
            StoreOptions::default().enforce_strength(enforce_strength),
        )
    }

    /// Create an empty store protected by `secret`.
    pub fn with_options(secret: &str, options: StoreOptions) -> Result<Self, StoreError> {
        if secret.is_empty() {
            return Err(StoreError::InvalidSecret("secret must not be empty".to_string()));
        }
        if options.enforce_strength {
            options.policy.check(secret)?;
        }

        let mut salt = vec![0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| StoreError::Codec(format!("randomness unavailable: {}", e)))?;

        let key = derive_store_key(options.deriver.as_ref(), secret, &salt)?;
        let codec = BlockCodec::new(key)?;

        tracing::info!(
            enforce_strength = options.enforce_strength,
            "Created new secure store"
        );

        Ok(Self {
            salt,
            codec,
            deriver: options.deriver,
            write_attempts: options.write_attempts,
            state: Mutex::new(StoreState::default()),
        })
    }

    /// Load a store from `path`, using default options.
    pub fn load(path: impl AsRef<Path>, secret: &str) -> Result<Self, StoreError> {
        Self::load_with_options(path, secret, StoreOptions::default())
    }

    /// Load a store from `path` and verify its signature under the key
    /// derived from `secret`. A mismatch fails with `NotGenuine`.
    pub fn load_with_options(
        path: impl AsRef<Path>,
        secret: &str,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = StoreFile::read(path)?;

        if file.salt.len() != SALT_LEN {
            return Err(StoreError::NotGenuine(format!(
                "salt is {} bytes, expected {}",
                file.salt.len(),
                SALT_LEN
            )));
        }

        let key = derive_store_key(options.deriver.as_ref(), secret, &file.salt)?;

        if let Err(e) = verify_entries(&key, &file.entries, &file.signature) {
            tracing::warn!(path = %path.display(), "Rejected secure store: signature mismatch");
            return Err(e);
        }

        let codec = BlockCodec::new(key)?;

        tracing::info!(
            path = %path.display(),
            rows = file.entries.len(),
            "Loaded secure store"
        );

        Ok(Self {
            salt: file.salt,
            codec,
            deriver: options.deriver,
            write_attempts: options.write_attempts,
            state: Mutex::new(StoreState {
                signature: file.signature,
                entries: file.entries,
            }),
        })
    }

    /// Sign the current entries and persist them to `path`.
    /// The lock is held only while the entries are signed and copied.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();

        let file = {
            let state = self.lock();
            let signature = sign_entries(self.codec.key(), &state.entries)?;
            StoreFile {
                salt: self.salt.clone(),
                signature,
                entries: state.entries.clone(),
            }
        };

        write_atomic(path, &file.to_json()?, self.write_attempts)?;
        self.lock().signature = file.signature.clone();

        tracing::info!(
            path = %path.display(),
            rows = file.entries.len(),
            "Secure store persisted"
        );
        Ok(())
    }

    /// Store `value` under `key`, replacing any previous value.
    /// Keys and values containing NUL are rejected: NUL marks the end of the
    /// plaintext inside the padded ciphertext.
    pub fn add(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if key.contains('\0') {
            return Err(StoreError::Codec("key contains a NUL character".to_string()));
        }
        if value.contains('\0') {
            return Err(StoreError::Codec("value contains a NUL character".to_string()));
        }

        let index = index_token(key);
        let cipher_value = self.codec.encrypt(value.as_bytes(), IvMode::Random)?;

        let mut state = self.lock();

        // An existing key keeps its seed, so its entry token is overwritten in place.
        let seed = match state.entries.get(&index) {
            Some(seed) => seed.clone(),
            None => new_key_seed()?,
        };
        let entry = entry_token(&self.codec, key, &seed)?;

        state.entries.insert(index, seed);
        state.entries.insert(entry, cipher_value);

        tracing::debug!(rows = state.entries.len(), "Entry stored");
        Ok(())
    }

    /// Fetch the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Zeroizing<String>, StoreError> {
        let state = self.lock();
        let (_, entry) = self.locate(&state.entries, key)?;
        let cipher_value = state.entries.get(&entry).ok_or(StoreError::KeyNotFound)?;

        let raw = extract_value(&self.codec.decrypt(cipher_value)?)?;
        let value = String::from_utf8(raw)
            .map_err(|_| StoreError::Codec("stored value is not valid UTF-8".to_string()))?;
        Ok(Zeroizing::new(value))
    }

    /// Delete `key` and its value.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        let (index, entry) = self.locate(&state.entries, key)?;
        if !state.entries.contains_key(&entry) {
            return Err(StoreError::KeyNotFound);
        }

        state.entries.remove(&index);
        state.entries.remove(&entry);

        tracing::debug!(rows = state.entries.len(), "Entry removed");
        Ok(())
    }

    /// Whether `candidate` derives the same key as this store's secret.
    /// The key comparison runs in constant time.
    pub fn is_secret_match(&self, candidate: &str) -> bool {
        match derive_store_key(self.deriver.as_ref(), candidate, &self.salt) {
            Ok(candidate_key) => candidate_key.as_slice().ct_eq(self.codec.key()).into(),
            Err(_) => false,
        }
    }

    /// Decrypt every live entry back to plaintext. Rows that are not live
    /// entries (index rows, stale or foreign rows) are skipped and logged.
    pub fn decrypt_all(&self) -> BTreeMap<String, String> {
        let state = self.lock();
        let mut plaintext = BTreeMap::new();
        let mut skipped = 0usize;

        for (token, cipher_value) in &state.entries {
            match self.decrypt_row(&state.entries, token, cipher_value) {
                Ok((key, value)) => {
                    plaintext.insert(key, value);
                }
                Err(e) => {
                    skipped += 1;
                    tracing::trace!(error = %e, "Skipping row that is not a live entry");
                }
            }
        }

        tracing::debug!(live = plaintext.len(), skipped, "Decrypted store contents");
        plaintext
    }

    /// Number of logical keys currently stored.
    pub fn len(&self) -> usize {
        self.decrypt_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of raw rows (index and entry tokens) in the map.
    pub fn row_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Signature of the last successful `store()`, or the one read by `load()`.
    pub fn signature(&self) -> Vec<u8> {
        self.lock().signature.clone()
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Every mutation completes its inserts/removes before returning, so a
        // poisoned map is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve `key` to its (index token, entry token) pair.
    fn locate(
        &self,
        entries: &BTreeMap<String, String>,
        key: &str,
    ) -> Result<(String, String), StoreError> {
        let index = index_token(key);
        let seed = entries.get(&index).ok_or(StoreError::KeyNotFound)?;
        let entry = entry_token(&self.codec, key, seed)?;
        Ok((index, entry))
    }

    fn decrypt_row(
        &self,
        entries: &BTreeMap<String, String>,
        token: &str,
        cipher_value: &str,
    ) -> Result<(String, String), StoreError> {
        let key = String::from_utf8(extract_value(&self.codec.decrypt(token)?)?)
            .map_err(|_| StoreError::Codec("row key is not valid UTF-8".to_string()))?;

        let (_, expected) = self.locate(entries, &key)?;
        if expected != token {
            return Err(StoreError::NotGenuine("row is not the current entry for its key".to_string()));
        }

        let value = String::from_utf8(extract_value(&self.codec.decrypt(cipher_value)?)?)
            .map_err(|_| StoreError::Codec("row value is not valid UTF-8".to_string()))?;
        Ok((key, value))
    }
}

/// Custom Debug implementation that never reveals the key or entries.
impl fmt::Debug for SecureStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureStore")
            .field("codec", &self.codec)
            .field("rows", &self.row_count())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
