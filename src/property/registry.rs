// Strongroom — Property registry
//
// Maps property names to codecs. Built once at startup and passed by
// reference; there is no process-wide registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::codec::{
    FlagCodec, IntegerCodec, PropertyCodec, SecretTextCodec, StringListCodec, TextCodec,
};
use super::PropertyError;

#[derive(Default)]
pub struct PropertyRegistry {
    codecs: BTreeMap<String, Arc<dyn PropertyCodec>>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the account properties used by the admin tools.
    pub fn with_defaults() -> Self {
        let defaults: [(&str, Arc<dyn PropertyCodec>); 6] = [
            ("display_name", Arc::new(TextCodec)),
            ("password", Arc::new(SecretTextCodec)),
            ("otp_secret", Arc::new(SecretTextCodec)),
            ("failed_logins", Arc::new(IntegerCodec)),
            ("disabled", Arc::new(FlagCodec)),
            ("roles", Arc::new(StringListCodec)),
        ];

        let mut registry = Self::new();
        for (name, codec) in defaults {
            registry.codecs.insert(name.to_string(), codec);
        }
        registry
    }

    /// Bind `property` to `codec`. A name can only be registered once.
    pub fn register(
        &mut self,
        property: &str,
        codec: Arc<dyn PropertyCodec>,
    ) -> Result<(), PropertyError> {
        if self.codecs.contains_key(property) {
            return Err(PropertyError::AlreadyRegistered(property.to_string()));
        }
        tracing::debug!(property, codec = codec.name(), "Registered property codec");
        self.codecs.insert(property.to_string(), codec);
        Ok(())
    }

    pub fn codec(&self, property: &str) -> Result<&dyn PropertyCodec, PropertyError> {
        self.codecs
            .get(property)
            .map(|codec| codec.as_ref())
            .ok_or_else(|| PropertyError::Unregistered(property.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.codecs.iter().map(|(name, codec)| (name, codec.name())))
            .finish()
    }
}
