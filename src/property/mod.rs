// Strongroom — Property Module
//
// Typed properties on top of the secure store. Each property name is bound to
// a codec at startup through an explicit registry; values are serialized to
// text and stored under "<entity>/<property>".

mod codec;
mod entity;
mod error;
mod registry;

pub use codec::{
    FlagCodec, IntegerCodec, PropertyCodec, PropertyValue, SecretTextCodec, StringListCodec,
    TextCodec,
};
pub use entity::{storage_key, PropertyStore};
pub use error::PropertyError;
pub use registry::PropertyRegistry;
