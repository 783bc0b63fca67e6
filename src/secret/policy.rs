// Strongroom — Secret strength policy
//
// The store only consults a policy when strength checking is requested.
// `DefaultSecretPolicy` reports every unmet rule in a single error so the
// caller can fix the secret in one pass. The default thresholds accept
// "Aa1!abcd"; `DefaultSecretPolicy::strict()` doubles the uppercase and
// digit requirements.

use super::SecretError;

/// Characters that satisfy the punctuation rule of the default policy.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// A pluggable secret-strength check.
pub trait SecretPolicy: Send + Sync {
    /// Returns `SecretError::Weak` describing the unmet rules, if any.
    fn check(&self, secret: &str) -> Result<(), SecretError>;
}

/// Minimum-strength rules: length, uppercase, lowercase, digits, punctuation.
#[derive(Clone, Debug)]
pub struct DefaultSecretPolicy {
    pub min_length: usize,
    pub min_uppercase: usize,
    pub min_lowercase: usize,
    pub min_digits: usize,
    pub min_punctuation: usize,
}

/// At least 8 characters, 1 uppercase, 2 lowercase, 1 digit and 1 punctuation
/// character. Accepts "Aa1!abcd"; see [`DefaultSecretPolicy::strict`] for the
/// two-uppercase, two-digit variant.
impl Default for DefaultSecretPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            min_uppercase: 1,
            min_lowercase: 2,
            min_digits: 1,
            min_punctuation: 1,
        }
    }
}

impl DefaultSecretPolicy {
    /// At least 8 characters, 2 uppercase, 2 lowercase, 2 digits, 1 punctuation.
    pub fn strict() -> Self {
        Self {
            min_uppercase: 2,
            min_digits: 2,
            ..Self::default()
        }
    }
}

impl SecretPolicy for DefaultSecretPolicy {
    fn check(&self, secret: &str) -> Result<(), SecretError> {
        let length = secret.chars().count();
        let uppercase = secret.chars().filter(|c| c.is_ascii_uppercase()).count();
        let lowercase = secret.chars().filter(|c| c.is_ascii_lowercase()).count();
        let digits = secret.chars().filter(|c| c.is_ascii_digit()).count();
        let punctuation = secret.chars().filter(|c| PUNCTUATION.contains(*c)).count();

        let mut unmet = Vec::new();
        if length < self.min_length {
            unmet.push(format!("at least {} characters", self.min_length));
        }
        if uppercase < self.min_uppercase {
            unmet.push(format!("at least {} uppercase letters", self.min_uppercase));
        }
        if lowercase < self.min_lowercase {
            unmet.push(format!("at least {} lowercase letters", self.min_lowercase));
        }
        if digits < self.min_digits {
            unmet.push(format!("at least {} digits", self.min_digits));
        }
        if punctuation < self.min_punctuation {
            unmet.push(format!(
                "at least {} punctuation characters from {}",
                self.min_punctuation, PUNCTUATION
            ));
        }

        if unmet.is_empty() {
            Ok(())
        } else {
            Err(SecretError::Weak(format!("secret needs {}", unmet.join(", "))))
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
