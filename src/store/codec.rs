// Strongroom — Block Cipher Codec
//
// Encrypts single byte sequences under the store key with AES-CBC.
// The plaintext is base64-encoded first and NUL bytes are appended to the raw
// plaintext until the base64 text is block-aligned, so CBC never needs a
// block-padding scheme. Tokens are base64(IV || ciphertext).
//
// Two IV modes:
//   - Random: a fresh IV from the OS RNG (values)
//   - Seeded: a deterministic IV built from a per-key seed (entry tokens),
//     which makes the same key encrypt to the same token under the same seed

use std::fmt;

use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroizing;

use super::StoreError;

/// AES block size in bytes; also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// Byte used to right-pad a short seed up to one IV block.
pub const IV_FILLER: u8 = b'0';

/// Key lengths accepted by the block cipher (AES-128/192/256).
pub const VALID_KEY_LENS: [usize; 3] = [16, 24, 32];

/// How the IV of an encryption is chosen.
#[derive(Clone, Copy, Debug)]
pub enum IvMode<'a> {
    /// Fresh random IV.
    Random,
    /// Deterministic IV derived from the given seed.
    Seeded(&'a str),
}

/// AES-CBC codec bound to one store key.
pub struct BlockCodec {
    key: Zeroizing<Vec<u8>>,
}

impl BlockCodec {
    /// Build a codec, rejecting keys the cipher cannot use.
    pub fn new(key: Zeroizing<Vec<u8>>) -> Result<Self, StoreError> {
        if !VALID_KEY_LENS.contains(&key.len()) {
            return Err(StoreError::Codec(format!(
                "invalid key length {}, expected one of {:?}",
                key.len(),
                VALID_KEY_LENS
            )));
        }
        Ok(Self { key })
    }

    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }

    /// Encrypt `plaintext` into a base64 token carrying its IV.
    pub fn encrypt(&self, plaintext: &[u8], iv_mode: IvMode<'_>) -> Result<String, StoreError> {
        let padded = padded_base64(plaintext);

        let iv = match iv_mode {
            IvMode::Random => random_iv()?,
            IvMode::Seeded(seed) => seeded_iv(seed),
        };

        let ciphertext = self.cbc_encrypt(&iv, padded.as_bytes())?;

        let mut blob = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
        blob.extend_from_slice(&iv);
        blob.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(blob))
    }

    /// Decrypt a token back to its padded base64 text.
    /// Use [`extract_value`] to recover the original bytes.
    pub fn decrypt(&self, token: &str) -> Result<String, StoreError> {
        let blob = STANDARD
            .decode(token)
            .map_err(|e| StoreError::Codec(format!("token is not valid base64: {}", e)))?;

        if blob.len() < BLOCK_SIZE {
            return Err(StoreError::Codec(format!(
                "token too short: {} bytes, need at least {}",
                blob.len(),
                BLOCK_SIZE
            )));
        }

        let (iv, ciphertext) = blob.split_at(BLOCK_SIZE);
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(StoreError::Codec(format!(
                "ciphertext length {} is not a multiple of the block size",
                ciphertext.len()
            )));
        }

        let plaintext = self.cbc_decrypt(iv, ciphertext)?;
        String::from_utf8(plaintext)
            .map_err(|_| StoreError::Codec("decrypted text is not base64".to_string()))
    }

    fn cbc_encrypt(&self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>, StoreError> {
        if data.len() % BLOCK_SIZE != 0 {
            return Err(StoreError::Codec("plaintext is not block-aligned".to_string()));
        }

        let key = self.key.as_slice();
        let ciphertext = match key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<NoPadding>(data)),
            24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<NoPadding>(data)),
            _ => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<NoPadding>(data)),
        };

        ciphertext.map_err(|e| StoreError::Codec(format!("cipher init failed: {}", e)))
    }

    fn cbc_decrypt(&self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>, StoreError> {
        let key = self.key.as_slice();
        let plaintext = match key.len() {
            16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<NoPadding>(data)),
            24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<NoPadding>(data)),
            _ => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<NoPadding>(data)),
        };

        plaintext
            .map_err(|e| StoreError::Codec(format!("cipher init failed: {}", e)))?
            .map_err(|_| StoreError::Codec("ciphertext could not be decrypted".to_string()))
    }
}

impl fmt::Debug for BlockCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCodec")
            .field("key", &"[REDACTED]")
            .field("key_len", &self.key.len())
            .finish()
    }
}

/// Recover the original bytes from decrypted text: base64-decode, then cut
/// at the first NUL (the padding marker).
pub fn extract_value(decrypted: &str) -> Result<Vec<u8>, StoreError> {
    let mut raw = STANDARD
        .decode(decrypted)
        .map_err(|e| StoreError::Codec(format!("decrypted text is not valid base64: {}", e)))?;

    if let Some(end) = raw.iter().position(|b| *b == 0) {
        raw.truncate(end);
    }
    Ok(raw)
}

/// Base64 of `plaintext` with NULs appended until the text is block-aligned.
fn padded_base64(plaintext: &[u8]) -> String {
    let mut raw = plaintext.to_vec();
    let mut encoded = STANDARD.encode(&raw);
    while encoded.len() % BLOCK_SIZE != 0 {
        raw.push(0);
        encoded = STANDARD.encode(&raw);
    }
    encoded
}

fn random_iv() -> Result<[u8; BLOCK_SIZE], StoreError> {
    let mut iv = [0u8; BLOCK_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| StoreError::Codec(format!("randomness unavailable: {}", e)))?;
    Ok(iv)
}

/// The seed right-padded with `IV_FILLER` and cut to exactly one block.
fn seeded_iv(seed: &str) -> [u8; BLOCK_SIZE] {
    let mut iv = [IV_FILLER; BLOCK_SIZE];
    let seed = seed.as_bytes();
    let n = seed.len().min(BLOCK_SIZE);
    iv[..n].copy_from_slice(&seed[..n]);
    iv
}

// ─── Tests ───────────────────────────────────────────────────────────────────
