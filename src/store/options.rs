// Strongroom — Store options
//
// Runtime knobs for creating and loading a secure store. `Default` gives the
// production setup: Argon2id derivation, the default strength policy, no
// strength enforcement.

use std::fmt;
use std::sync::Arc;

use crate::secret::{Argon2Deriver, Argon2Params, DefaultSecretPolicy, KeyDeriver, SecretPolicy};

/// How many temporary file names `store` tries before giving up.
pub const DEFAULT_WRITE_ATTEMPTS: usize = 10;

#[derive(Clone)]
pub struct StoreOptions {
    pub enforce_strength: bool,
    pub deriver: Arc<dyn KeyDeriver>,
    pub policy: Arc<dyn SecretPolicy>,
    pub write_attempts: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            enforce_strength: false,
            deriver: Arc::new(Argon2Deriver::default()),
            policy: Arc::new(DefaultSecretPolicy::default()),
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
        }
    }
}

impl StoreOptions {
    pub fn enforce_strength(mut self, enforce: bool) -> Self {
        self.enforce_strength = enforce;
        self
    }

    pub fn with_deriver(mut self, deriver: Arc<dyn KeyDeriver>) -> Self {
        self.deriver = deriver;
        self
    }

    /// Shorthand for an Argon2id deriver with custom cost parameters.
    pub fn with_argon2(self, params: Argon2Params) -> Self {
        self.with_deriver(Arc::new(Argon2Deriver::new(params)))
    }

    pub fn with_policy(mut self, policy: Arc<dyn SecretPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_write_attempts(mut self, attempts: usize) -> Self {
        self.write_attempts = attempts.max(1);
        self
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("enforce_strength", &self.enforce_strength)
            .field("write_attempts", &self.write_attempts)
            .finish_non_exhaustive()
    }
}
