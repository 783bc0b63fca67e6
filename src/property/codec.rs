// Strongroom — Property codecs
//
// A codec turns one kind of typed property value into the text stored in the
// secure store and back. Codecs also own equality (so secret values can be
// compared in constant time) and how a value is shown in diagnostics.

use std::fmt;

use subtle::ConstantTimeEq;

use super::PropertyError;

/// A typed property value.
#[derive(Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    List(Vec<String>),
}

impl PropertyValue {
    fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "text",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Flag(_) => "flag",
            PropertyValue::List(_) => "list",
        }
    }
}

/// Debug never shows text contents; use a codec's `debug_print` instead.
impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(text) => write!(f, "Text(<{} bytes>)", text.len()),
            PropertyValue::Integer(n) => write!(f, "Integer({})", n),
            PropertyValue::Flag(b) => write!(f, "Flag({})", b),
            PropertyValue::List(items) => write!(f, "List(<{} items>)", items.len()),
        }
    }
}

/// Serialization capability for one property type.
pub trait PropertyCodec: Send + Sync {
    /// Short name used in errors and diagnostics.
    fn name(&self) -> &'static str;

    fn serialize(&self, value: &PropertyValue) -> Result<String, PropertyError>;

    fn deserialize(&self, raw: &str) -> Result<PropertyValue, PropertyError>;

    fn equals(&self, stored: &PropertyValue, candidate: &PropertyValue) -> bool {
        stored == candidate
    }

    /// Human-readable rendering for logs and admin output.
    fn debug_print(&self, value: &PropertyValue) -> String;
}

fn mismatch(codec: &'static str, expected: &'static str) -> PropertyError {
    PropertyError::Mismatch { codec, expected }
}

// ─── Built-in codecs ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct TextCodec;

impl PropertyCodec for TextCodec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn serialize(&self, value: &PropertyValue) -> Result<String, PropertyError> {
        match value {
            PropertyValue::Text(text) => Ok(text.clone()),
            _ => Err(mismatch(self.name(), "text")),
        }
    }

    fn deserialize(&self, raw: &str) -> Result<PropertyValue, PropertyError> {
        Ok(PropertyValue::Text(raw.to_string()))
    }

    fn debug_print(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Text(text) => format!("{:?}", text),
            other => format!("<{}>", other.kind()),
        }
    }
}

/// Text whose contents must never be displayed, compared in constant time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecretTextCodec;

impl PropertyCodec for SecretTextCodec {
    fn name(&self) -> &'static str {
        "secret-text"
    }

    fn serialize(&self, value: &PropertyValue) -> Result<String, PropertyError> {
        match value {
            PropertyValue::Text(text) => Ok(text.clone()),
            _ => Err(mismatch(self.name(), "text")),
        }
    }

    fn deserialize(&self, raw: &str) -> Result<PropertyValue, PropertyError> {
        Ok(PropertyValue::Text(raw.to_string()))
    }

    fn equals(&self, stored: &PropertyValue, candidate: &PropertyValue) -> bool {
        match (stored, candidate) {
            (PropertyValue::Text(a), PropertyValue::Text(b)) => {
                a.as_bytes().ct_eq(b.as_bytes()).into()
            }
            _ => false,
        }
    }

    fn debug_print(&self, _value: &PropertyValue) -> String {
        "[REDACTED]".to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerCodec;

impl PropertyCodec for IntegerCodec {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn serialize(&self, value: &PropertyValue) -> Result<String, PropertyError> {
        match value {
            PropertyValue::Integer(n) => Ok(n.to_string()),
            _ => Err(mismatch(self.name(), "integer")),
        }
    }

    fn deserialize(&self, raw: &str) -> Result<PropertyValue, PropertyError> {
        raw.trim()
            .parse::<i64>()
            .map(PropertyValue::Integer)
            .map_err(|e| PropertyError::Malformed {
                codec: self.name(),
                reason: e.to_string(),
            })
    }

    fn debug_print(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Integer(n) => n.to_string(),
            other => format!("<{}>", other.kind()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FlagCodec;

impl PropertyCodec for FlagCodec {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn serialize(&self, value: &PropertyValue) -> Result<String, PropertyError> {
        match value {
            PropertyValue::Flag(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            _ => Err(mismatch(self.name(), "flag")),
        }
    }

    fn deserialize(&self, raw: &str) -> Result<PropertyValue, PropertyError> {
        match raw.trim() {
            "1" | "true" => Ok(PropertyValue::Flag(true)),
            "0" | "false" => Ok(PropertyValue::Flag(false)),
            other => Err(PropertyError::Malformed {
                codec: self.name(),
                reason: format!("unexpected flag value '{}'", other),
            }),
        }
    }

    fn debug_print(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Flag(b) => b.to_string(),
            other => format!("<{}>", other.kind()),
        }
    }
}

/// A list of strings stored as a JSON array.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringListCodec;

impl PropertyCodec for StringListCodec {
    fn name(&self) -> &'static str {
        "string-list"
    }

    fn serialize(&self, value: &PropertyValue) -> Result<String, PropertyError> {
        match value {
            PropertyValue::List(items) => {
                serde_json::to_string(items).map_err(|e| PropertyError::Malformed {
                    codec: self.name(),
                    reason: e.to_string(),
                })
            }
            _ => Err(mismatch(self.name(), "list")),
        }
    }

    fn deserialize(&self, raw: &str) -> Result<PropertyValue, PropertyError> {
        serde_json::from_str::<Vec<String>>(raw)
            .map(PropertyValue::List)
            .map_err(|e| PropertyError::Malformed {
                codec: self.name(),
                reason: e.to_string(),
            })
    }

    fn debug_print(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::List(items) => format!("[{}]", items.join(", ")),
            other => format!("<{}>", other.kind()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(codec: &dyn PropertyCodec, value: PropertyValue) {
        let raw = codec.serialize(&value).unwrap();
        assert_eq!(codec.deserialize(&raw).unwrap(), value, "codec {}", codec.name());
    }

    #[test]
    fn test_builtin_roundtrips() {
        roundtrip(&TextCodec, PropertyValue::Text("Alice Example".into()));
        roundtrip(&SecretTextCodec, PropertyValue::Text("hunter2".into()));
        roundtrip(&IntegerCodec, PropertyValue::Integer(-42));
        roundtrip(&FlagCodec, PropertyValue::Flag(true));
        roundtrip(&FlagCodec, PropertyValue::Flag(false));
        roundtrip(
            &StringListCodec,
            PropertyValue::List(vec!["admin".into(), "a, b".into(), String::new()]),
        );
    }

    #[test]
    fn test_wrong_value_type_is_rejected() {
        let err = IntegerCodec
            .serialize(&PropertyValue::Text("12".into()))
            .unwrap_err();
        assert!(matches!(err, PropertyError::Mismatch { codec: "integer", .. }));
        assert!(FlagCodec.serialize(&PropertyValue::Integer(1)).is_err());
        assert!(StringListCodec.serialize(&PropertyValue::Flag(true)).is_err());
    }

    #[test]
    fn test_malformed_raw_values() {
        assert!(matches!(
            IntegerCodec.deserialize("twelve"),
            Err(PropertyError::Malformed { .. })
        ));
        assert!(FlagCodec.deserialize("yes").is_err());
        assert!(StringListCodec.deserialize("not json").is_err());
    }

    #[test]
    fn test_secret_text_is_redacted() {
        let value = PropertyValue::Text("hunter2".into());
        assert_eq!(SecretTextCodec.debug_print(&value), "[REDACTED]");
        assert_eq!(TextCodec.debug_print(&value), "\"hunter2\"");
        assert!(!format!("{:?}", value).contains("hunter2"));
    }

    #[test]
    fn test_secret_text_equality() {
        let stored = PropertyValue::Text("hunter2".into());
        assert!(SecretTextCodec.equals(&stored, &PropertyValue::Text("hunter2".into())));
        assert!(!SecretTextCodec.equals(&stored, &PropertyValue::Text("hunter3".into())));
        assert!(!SecretTextCodec.equals(&stored, &PropertyValue::Integer(7)));
    }
}
