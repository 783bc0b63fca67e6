// Strongroom — CLI Command Handlers
//
// Each function handles one CLI subcommand. Every command except `init`
// loads (and thereby verifies) the store first; mutating commands write it
// back before returning.

use std::fs;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::error::StrongroomError;
use crate::property::{PropertyRegistry, PropertyStore};
use crate::store::SecureStore;

use super::{Cli, Commands, PropAction};

/// Default directory for Strongroom data files.
fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("strongroom")
}

/// Path to the store file when `--store` is not given.
pub fn default_store_path() -> PathBuf {
    data_dir().join("store.json")
}

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), StrongroomError> {
    let path = cli.store.unwrap_or_else(default_store_path);
    let secret = Zeroizing::new(cli.secret.ok_or_else(|| {
        StrongroomError::Other(
            "No secret given. Pass --secret or set STRONGROOM_SECRET.".to_string(),
        )
    })?);

    match cli.command {
        Commands::Init { no_strength_check } => cmd_init(&path, &secret, !no_strength_check),
        Commands::Put { key, value } => cmd_put(&path, &secret, &key, &value),
        Commands::Get { key } => cmd_get(&path, &secret, &key),
        Commands::Remove { key } => cmd_remove(&path, &secret, &key),
        Commands::Dump => cmd_dump(&path, &secret),
        Commands::Verify => cmd_verify(&path, &secret),
        Commands::Destroy { confirm_secret } => {
            cmd_destroy(&path, &secret, &Zeroizing::new(confirm_secret))
        }
        Commands::Prop { action } => cmd_prop(&path, &secret, action),
    }
}

// ─── Init ────────────────────────────────────────────────────────────────────

fn cmd_init(path: &Path, secret: &str, enforce_strength: bool) -> Result<(), StrongroomError> {
    if path.exists() {
        return Err(StrongroomError::Other(format!(
            "A store already exists at {}. Use `strongroom destroy` first.",
            path.display()
        )));
    }

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let store = SecureStore::new(secret, enforce_strength)?;
    store.store(path)?;

    println!("✓ Strongroom initialized");
    println!("  Store: {}", path.display());
    println!();
    println!("Next: add a value with `strongroom put <key> <value>`");

    Ok(())
}

// ─── Put / Get / Remove ──────────────────────────────────────────────────────

fn cmd_put(path: &Path, secret: &str, key: &str, value: &str) -> Result<(), StrongroomError> {
    let store = open_store(path, secret)?;
    store.add(key, value)?;
    store.store(path)?;

    println!("✓ Stored '{}'", key);
    Ok(())
}

fn cmd_get(path: &Path, secret: &str, key: &str) -> Result<(), StrongroomError> {
    let store = open_store(path, secret)?;
    let value = store.get(key)?;
    println!("{}", value.as_str());
    Ok(())
}

fn cmd_remove(path: &Path, secret: &str, key: &str) -> Result<(), StrongroomError> {
    let store = open_store(path, secret)?;
    store.remove(key)?;
    store.store(path)?;

    println!("✓ Removed '{}'", key);
    Ok(())
}

// ─── Dump / Verify ───────────────────────────────────────────────────────────

fn cmd_dump(path: &Path, secret: &str) -> Result<(), StrongroomError> {
    let store = open_store(path, secret)?;
    let entries = store.decrypt_all();

    if entries.is_empty() {
        println!("Store is empty.");
        return Ok(());
    }

    println!("Stored values ({}):\n", entries.len());
    for (key, value) in &entries {
        println!("  {} = {}", key, value);
    }

    Ok(())
}

fn cmd_verify(path: &Path, secret: &str) -> Result<(), StrongroomError> {
    let store = open_store(path, secret)?;

    println!("✓ Store is genuine");
    println!("  Store: {}", path.display());
    println!("  Keys:  {}", store.len());
    Ok(())
}

// ─── Destroy ─────────────────────────────────────────────────────────────────

fn cmd_destroy(path: &Path, secret: &str, confirm_secret: &str) -> Result<(), StrongroomError> {
    let store = open_store(path, secret)?;

    if !store.is_secret_match(confirm_secret) {
        tracing::warn!(path = %path.display(), "Destroy refused: confirmation secret mismatch");
        return Err(StrongroomError::Other(
            "Confirmation secret does not match the store secret.".to_string(),
        ));
    }

    fs::remove_file(path)?;
    tracing::info!(path = %path.display(), "Store destroyed");

    println!("✓ Store {} deleted", path.display());
    Ok(())
}

// ─── Properties ──────────────────────────────────────────────────────────────

fn cmd_prop(path: &Path, secret: &str, action: PropAction) -> Result<(), StrongroomError> {
    let store = open_store(path, secret)?;
    let registry = PropertyRegistry::with_defaults();
    let props = PropertyStore::new(&store, &registry);

    match action {
        PropAction::Set {
            entity,
            property,
            value,
        } => {
            let value = registry.codec(&property)?.deserialize(&value)?;
            props.set(&entity, &property, &value)?;
            store.store(path)?;
            println!("✓ {}.{} updated", entity, property);
        }
        PropAction::Get { entity, property } => {
            println!("{}", props.describe(&entity, &property)?);
        }
        PropAction::Remove { entity, property } => {
            props.remove(&entity, &property)?;
            store.store(path)?;
            println!("✓ {}.{} removed", entity, property);
        }
        PropAction::Check {
            entity,
            property,
            value,
        } => {
            let candidate = registry.codec(&property)?.deserialize(&value)?;
            if props.matches(&entity, &property, &candidate)? {
                println!("✓ {}.{} matches", entity, property);
            } else {
                return Err(StrongroomError::Other(format!(
                    "{}.{} does not match",
                    entity, property
                )));
            }
        }
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Load and verify the store at `path`.
fn open_store(path: &Path, secret: &str) -> Result<SecureStore, StrongroomError> {
    if !path.exists() {
        return Err(StrongroomError::Other(format!(
            "No store found at {}. Run `strongroom init` first.",
            path.display()
        )));
    }

    Ok(SecureStore::load(path, secret)?)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use clap::Parser;

    const SECRET: &str = "Aa1!abcd";

    fn run(path: &Path, secret: &str, args: &[&str]) -> Result<(), StrongroomError> {
        let path = path.to_string_lossy().into_owned();
        let mut argv = vec!["strongroom", "--store", path.as_str(), "--secret", secret];
        argv.extend_from_slice(args);
        execute(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_default_store_path() {
        let path = default_store_path();
        assert!(path.ends_with("strongroom/store.json"));
    }

    #[test]
    fn test_init_put_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        run(&path, SECRET, &["init"]).unwrap();
        assert!(path.exists());

        run(&path, SECRET, &["put", "k1", "v1"]).unwrap();
        run(&path, SECRET, &["get", "k1"]).unwrap();

        let store = SecureStore::load(&path, SECRET).unwrap();
        assert_eq!(store.get("k1").unwrap().as_str(), "v1");

        run(&path, SECRET, &["remove", "k1"]).unwrap();
        let err = run(&path, SECRET, &["get", "k1"]).unwrap_err();
        assert!(matches!(err, StrongroomError::Store(StoreError::KeyNotFound)));
    }

    #[test]
    fn test_init_refuses_existing_store_and_weak_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let err = run(&path, "abc", &["init"]).unwrap_err();
        assert!(matches!(err, StrongroomError::Store(StoreError::WeakSecret(_))));

        run(&path, "abc", &["init", "--no-strength-check"]).unwrap();
        assert!(matches!(run(&path, "abc", &["init"]), Err(StrongroomError::Other(_))));
    }

    #[test]
    fn test_wrong_secret_and_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        assert!(matches!(run(&path, SECRET, &["verify"]), Err(StrongroomError::Other(_))));

        run(&path, SECRET, &["init"]).unwrap();
        run(&path, SECRET, &["verify"]).unwrap();
        let err = run(&path, "Wrong1!secret", &["dump"]).unwrap_err();
        assert!(matches!(err, StrongroomError::Store(StoreError::NotGenuine(_))));
    }

    #[test]
    fn test_destroy_requires_matching_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        run(&path, SECRET, &["init"]).unwrap();

        assert!(run(&path, SECRET, &["destroy", "--confirm-secret", "nope"]).is_err());
        assert!(path.exists());

        run(&path, SECRET, &["destroy", "--confirm-secret", SECRET]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_prop_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        run(&path, SECRET, &["init"]).unwrap();

        run(&path, SECRET, &["prop", "set", "alice", "failed_logins", "2"]).unwrap();
        run(&path, SECRET, &["prop", "set", "alice", "password", "hunter2"]).unwrap();
        run(&path, SECRET, &["prop", "check", "alice", "password", "hunter2"]).unwrap();
        assert!(run(&path, SECRET, &["prop", "check", "alice", "password", "nope"]).is_err());
        assert!(run(&path, SECRET, &["prop", "set", "alice", "failed_logins", "two"]).is_err());

        run(&path, SECRET, &["prop", "remove", "alice", "failed_logins"]).unwrap();
        let store = SecureStore::load(&path, SECRET).unwrap();
        assert!(store.get("alice/failed_logins").is_err());
        assert_eq!(store.get("alice/password").unwrap().as_str(), "hunter2");
    }
}
