// Strongroom — Persistence & Integrity
//
// On-disk format (JSON):
//   {
//     "salt":      "<base64>",   KDF salt, stored in clear
//     "signature": "<base64>",   HMAC-SHA256(store key, canonical entries)
//     "entries":   { "<token>": "<token>", ... }
//   }
//
// The canonical form of the entries is their JSON serialization with sorted
// keys (the map is a BTreeMap). Files are written to a sibling temporary file
// with owner-only permissions and then renamed over the target.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::StoreError;

type HmacSha256 = Hmac<Sha256>;

/// Serialized shape of a secure store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
    pub entries: BTreeMap<String, String>,
}

impl StoreFile {
    /// Read and parse a store file. Unparseable content is reported as
    /// `NotGenuine`; only filesystem failures are `Io`.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        let data = fs::read(path)?;
        serde_json::from_slice(&data)
            .map_err(|e| StoreError::NotGenuine(format!("malformed store file: {}", e)))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::Codec(format!("failed to serialize store file: {}", e)))
    }
}

// ─── Signature ───────────────────────────────────────────────────────────────

fn entries_mac(key: &[u8], entries: &BTreeMap<String, String>) -> Result<HmacSha256, StoreError> {
    let canonical = serde_json::to_vec(entries)
        .map_err(|e| StoreError::Codec(format!("failed to serialize entries: {}", e)))?;
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StoreError::Codec(format!("HMAC key init failed: {}", e)))?;
    mac.update(&canonical);
    Ok(mac)
}

/// HMAC-SHA256 over the canonical serialization of `entries`.
pub fn sign_entries(key: &[u8], entries: &BTreeMap<String, String>) -> Result<Vec<u8>, StoreError> {
    Ok(entries_mac(key, entries)?.finalize().into_bytes().to_vec())
}

/// Constant-time check of `signature` against `entries`.
pub fn verify_entries(
    key: &[u8],
    entries: &BTreeMap<String, String>,
    signature: &[u8],
) -> Result<(), StoreError> {
    entries_mac(key, entries)?
        .verify_slice(signature)
        .map_err(|_| StoreError::NotGenuine("signature mismatch".to_string()))
}

// ─── Atomic Write ────────────────────────────────────────────────────────────

/// Write `contents` to `path` via a temporary sibling file and a rename.
pub fn write_atomic(path: &Path, contents: &[u8], attempts: usize) -> Result<(), StoreError> {
    write_atomic_with(path, contents, attempts, random_suffix)
}

fn write_atomic_with(
    path: &Path,
    contents: &[u8],
    attempts: usize,
    mut next_suffix: impl FnMut() -> Result<String, StoreError>,
) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "store path has no file name")
        })?
        .to_string_lossy()
        .into_owned();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // At least one name is always tried.
    for attempt in 1..=attempts.max(1) {
        let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, next_suffix()?));

        let file = match create_owner_only(&tmp_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(attempt, "Temporary store file name taken, retrying");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let written = write_and_sync(file, contents).and_then(|_| fs::rename(&tmp_path, path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        return Ok(());
    }

    Err(StoreError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free temporary file name after {} attempts", attempts),
    )))
}

fn create_owner_only(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

fn write_and_sync(mut file: File, contents: &[u8]) -> io::Result<()> {
    file.write_all(contents)?;
    file.sync_all()
}

fn random_suffix() -> Result<String, StoreError> {
    let mut bytes = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| StoreError::Codec(format!("randomness unavailable: {}", e)))?;
    Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect())
}

// ─── Serde Helpers ───────────────────────────────────────────────────────────

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"abcdefghijklmnop";

    fn sample_entries() -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        entries.insert("index".to_string(), "seed".to_string());
        entries.insert("entry".to_string(), "value".to_string());
        entries
    }

    #[test]
    fn test_signature_verifies() {
        let entries = sample_entries();
        let sig = sign_entries(KEY, &entries).unwrap();
        assert_eq!(sig.len(), 32);
        assert!(verify_entries(KEY, &entries, &sig).is_ok());
    }

    #[test]
    fn test_signature_detects_changed_entries() {
        let mut entries = sample_entries();
        let sig = sign_entries(KEY, &entries).unwrap();
        entries.insert("entry".to_string(), "valuf".to_string());
        let err = verify_entries(KEY, &entries, &sig).unwrap_err();
        assert!(matches!(err, StoreError::NotGenuine(_)));
    }

    #[test]
    fn test_signature_detects_wrong_key() {
        let entries = sample_entries();
        let sig = sign_entries(KEY, &entries).unwrap();
        assert!(verify_entries(b"ponmlkjihgfedcba", &entries, &sig).is_err());
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let entries = sample_entries();
        let sig = sign_entries(KEY, &entries).unwrap();
        assert!(verify_entries(KEY, &entries, &sig[..16]).is_err());
        assert!(verify_entries(KEY, &entries, &[]).is_err());
    }

    #[test]
    fn test_store_file_json_shape() {
        let file = StoreFile {
            salt: b"8bytesal".to_vec(),
            signature: vec![1, 2, 3],
            entries: sample_entries(),
        };
        let json: serde_json::Value = serde_json::from_slice(&file.to_json().unwrap()).unwrap();
        assert_eq!(json["salt"], "OGJ5dGVzYWw=");
        assert_eq!(json["signature"], "AQID");
        assert_eq!(json["entries"]["index"], "seed");
    }

    #[test]
    fn test_read_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(StoreFile::read(&path), Err(StoreError::NotGenuine(_))));

        fs::write(&path, br#"{"salt":"!!","signature":"","entries":{}}"#).unwrap();
        assert!(matches!(StoreFile::read(&path), Err(StoreError::NotGenuine(_))));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreFile::read(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_write_atomic_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        write_atomic(&path, b"first", 3).unwrap();
        write_atomic(&path, b"second", 3).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary files must not be left behind");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        write_atomic(&path, b"data", 3).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_write_atomic_retries_on_name_collision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(dir.path().join(".store.json.taken.tmp"), b"squatter").unwrap();

        let mut suffixes = vec!["free", "taken"];
        write_atomic_with(&path, b"data", 3, || {
            Ok(suffixes.pop().unwrap_or("never").to_string())
        })
        .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"data");
    }

    #[test]
    fn test_write_atomic_with_zero_attempts_tries_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        write_atomic(&path, b"data", 0).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"data");
    }

    #[test]
    fn test_write_atomic_gives_up_after_bounded_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(dir.path().join(".store.json.taken.tmp"), b"squatter").unwrap();

        let err = write_atomic_with(&path, b"data", 4, || Ok("taken".to_string())).unwrap_err();
        assert!(matches!(err, StoreError::Io(ref e) if e.kind() == io::ErrorKind::AlreadyExists));
        assert!(!path.exists());
    }
}
