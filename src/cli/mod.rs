// Strongroom — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: init, put, get, remove, dump, verify, destroy, prop.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{default_store_path, execute};

/// Strongroom — encrypted, signed key-value storage.
#[derive(Parser, Debug)]
#[command(name = "strongroom")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the store file (defaults to the platform data directory).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// The store secret. Prefer the environment variable to keep it out of
    /// shell history.
    #[arg(long, global = true, env = "STRONGROOM_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty store.
    Init {
        /// Accept secrets that fail the strength policy.
        #[arg(long)]
        no_strength_check: bool,
    },

    /// Store a value under a key, replacing any previous value.
    Put {
        key: String,
        value: String,
    },

    /// Print the value stored under a key.
    Get {
        key: String,
    },

    /// Delete a key and its value.
    Remove {
        key: String,
    },

    /// Print every key and value in plaintext.
    Dump,

    /// Check that the store file is genuine for the given secret.
    Verify,

    /// Delete the store file.
    Destroy {
        /// The store secret, entered again to confirm.
        #[arg(long)]
        confirm_secret: String,
    },

    /// Read or write typed entity properties.
    Prop {
        #[command(subcommand)]
        action: PropAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum PropAction {
    /// Set a property; the value is parsed by the property's codec.
    Set {
        entity: String,
        property: String,
        value: String,
    },

    /// Show a property (secret properties are redacted).
    Get {
        entity: String,
        property: String,
    },

    /// Delete a property.
    Remove {
        entity: String,
        property: String,
    },

    /// Check whether a property equals the given value.
    Check {
        entity: String,
        property: String,
        value: String,
    },
}
