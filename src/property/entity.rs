// Strongroom — Entity properties
//
// Reads and writes typed properties of named entities (accounts, devices...)
// through a borrowed secure store. The store only ever sees the storage key
// "<entity>/<property>" and the codec's text form of the value.

use crate::store::SecureStore;

use super::codec::PropertyValue;
use super::registry::PropertyRegistry;
use super::PropertyError;

/// Storage key for `property` of `entity`.
pub fn storage_key(entity: &str, property: &str) -> Result<String, PropertyError> {
    if entity.is_empty() || entity.contains('/') {
        return Err(PropertyError::InvalidEntity(entity.to_string()));
    }
    Ok(format!("{}/{}", entity, property))
}

pub struct PropertyStore<'a> {
    store: &'a SecureStore,
    registry: &'a PropertyRegistry,
}

impl<'a> PropertyStore<'a> {
    pub fn new(store: &'a SecureStore, registry: &'a PropertyRegistry) -> Self {
        Self { store, registry }
    }

    pub fn set(
        &self,
        entity: &str,
        property: &str,
        value: &PropertyValue,
    ) -> Result<(), PropertyError> {
        let codec = self.registry.codec(property)?;
        let key = storage_key(entity, property)?;
        let raw = codec.serialize(value)?;
        self.store.add(&key, &raw)?;

        tracing::debug!(entity, property, codec = codec.name(), "Property set");
        Ok(())
    }

    pub fn get(&self, entity: &str, property: &str) -> Result<PropertyValue, PropertyError> {
        let codec = self.registry.codec(property)?;
        let raw = self.store.get(&storage_key(entity, property)?)?;
        codec.deserialize(&raw)
    }

    pub fn remove(&self, entity: &str, property: &str) -> Result<(), PropertyError> {
        self.registry.codec(property)?;
        self.store.remove(&storage_key(entity, property)?)?;
        Ok(())
    }

    /// Whether the stored value equals `candidate`, per the property's codec.
    pub fn matches(
        &self,
        entity: &str,
        property: &str,
        candidate: &PropertyValue,
    ) -> Result<bool, PropertyError> {
        let codec = self.registry.codec(property)?;
        let stored = self.get(entity, property)?;
        Ok(codec.equals(&stored, candidate))
    }

    /// Diagnostic rendering of the stored value; secret codecs redact it.
    pub fn describe(&self, entity: &str, property: &str) -> Result<String, PropertyError> {
        let codec = self.registry.codec(property)?;
        let stored = self.get(entity, property)?;
        Ok(format!("{}.{} = {}", entity, property, codec.debug_print(&stored)))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
