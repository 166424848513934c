//! Schema-less content records
//!
//! A record is an ordered list of named fields. Field order is preserved from
//! input to output so that serializing an unchanged record is byte-stable.

use crate::error::{Error, Result};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Deepest nesting accepted from client input
pub const MAX_NESTING_DEPTH: usize = 32;

/// One entry of a repeatable section: ordered sub-field name to text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentItem {
    fields: Vec<(String, String)>,
}

impl ContentItem {
    /// Create an empty item
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Get a sub-field value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a sub-field, replacing in place if it exists
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Builder-style [`set`](Self::set)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Iterate sub-fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of sub-fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the item has no sub-fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert from a JSON object whose values are all strings
    fn from_json_object(object: &serde_json::Map<String, Value>) -> Option<Self> {
        let mut item = Self::new();
        for (k, v) in object {
            item.fields.push((k.clone(), v.as_str()?.to_string()));
        }
        Some(item)
    }
}

impl Serialize for ContentItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Value of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scalar text (prose or an asset path)
    Text(String),
    /// Repeatable section; may be empty while unpopulated
    Items(Vec<ContentItem>),
    /// Anything else the editor produced, passed through untouched
    Opaque(Value),
}

impl FieldValue {
    /// Text value, if this is a scalar
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Items, if this is a repeatable section
    pub fn as_items(&self) -> Option<&[ContentItem]> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Array(elements) => {
                let items: Option<Vec<ContentItem>> = elements
                    .iter()
                    .map(|e| e.as_object().and_then(ContentItem::from_json_object))
                    .collect();
                match items {
                    Some(items) => Self::Items(items),
                    None => Self::Opaque(Value::Array(elements)),
                }
            }
            other => Self::Opaque(other),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Items(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Opaque(v) => v.serialize(serializer),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<ContentItem>> for FieldValue {
    fn from(items: Vec<ContentItem>) -> Self {
        Self::Items(items)
    }
}

/// An ordered mapping from field name to [`FieldValue`]
///
/// No schema is enforced: any object the editor submits is accepted, as long
/// as it is not nested deeper than [`MAX_NESTING_DEPTH`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ContentRecord {
    /// Create an empty record
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Get a field
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Set a field, replacing in place if it exists
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Builder-style [`set`](Self::set)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// Iterate fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a decoded JSON value
    ///
    /// The root must be an object. Over-deep input is rejected rather than
    /// walked, since records come straight from client requests.
    pub fn from_value(value: Value) -> Result<Self> {
        let depth = nesting_depth(&value);
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::Serialization(format!(
                "record nesting depth {depth} exceeds limit of {MAX_NESTING_DEPTH}"
            )));
        }

        let Value::Object(object) = value else {
            return Err(Error::Serialization(format!(
                "content record must be an object, got {}",
                json_type_name(&value)
            )));
        };

        Ok(Self {
            fields: object
                .into_iter()
                .map(|(k, v)| (k, FieldValue::from_json(v)))
                .collect(),
        })
    }

    /// Parse a record from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::Serialization(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Convert to a JSON value, preserving field order
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Serialize for ContentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContentRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Nesting depth of a JSON value, computed without recursion
fn nesting_depth(value: &Value) -> usize {
    let mut max = 0;
    let mut stack = vec![(value, 1usize)];
    while let Some((v, depth)) = stack.pop() {
        max = max.max(depth);
        match v {
            Value::Array(a) => stack.extend(a.iter().map(|c| (c, depth + 1))),
            Value::Object(o) => stack.extend(o.values().map(|c| (c, depth + 1))),
            _ => {}
        }
    }
    max
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
