//! Value trees on both sides of the codec.
//!
//! [`WireValue`] is what the invoker sends and receives: wire field names,
//! untyped scalars. [`ModelValue`] is the object model: model field names,
//! enums tagged as known or unknown, and [`Record`]s that keep "field omitted"
//! (absent key) apart from "field explicitly empty" (present `Null`, empty
//! list or empty string).

use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

/// Value in wire format
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    List(Vec<WireValue>),
    Object(IndexMap<String, WireValue>),
}

impl WireValue {
    /// Empty object
    pub fn object() -> Self {
        Self::Object(IndexMap::new())
    }

    /// Member lookup on objects; `None` for other kinds.
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        match self {
            Self::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, WireValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Render as JSON. Blobs become base64 text, timestamps RFC 3339 text.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Integer(value) => Value::from(*value),
            Self::Float(value) => serde_json::Number::from_f64(*value)
                .map_or(Value::Null, Value::Number),
            Self::String(value) => Value::String(value.clone()),
            Self::Blob(bytes) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Self::Timestamp(at) => Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::List(items) => Value::Array(items.iter().map(WireValue::to_json).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for WireValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Float(number.as_f64().unwrap_or(f64::NAN)), Self::Integer),
            Value::String(value) => Self::String(value),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Enumeration value as decoded from the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumValue {
    /// One of the values listed in the description
    Known(String),
    /// A value the description does not know about (newer service)
    Unknown(String),
}

impl EnumValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(value) | Self::Unknown(value) => value,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// Value in model format
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Enum(EnumValue),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    List(Vec<ModelValue>),
    Map(IndexMap<String, ModelValue>),
    Record(Record),
}

impl ModelValue {
    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Blob(bytes.into())
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ModelValue>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Text of strings and enums.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::Enum(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ModelValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
        }
    }
}

impl From<&str> for ModelValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ModelValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for ModelValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ModelValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Record> for ModelValue {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<DateTime<Utc>> for ModelValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Structure instance keyed by model field names.
///
/// `shape` is set on records produced by decoding; hand-built records may
/// leave it empty, in which case the codec accepts them for any structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    shape: Option<String>,
    fields: IndexMap<String, ModelValue>,
}

impl Record {
    /// Untyped record
    pub fn new() -> Self {
        Self::default()
    }

    /// Record tagged with a shape name
    pub fn of(shape: impl Into<String>) -> Self {
        Self {
            shape: Some(shape.into()),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn shape(&self) -> Option<&str> {
        self.shape.as_deref()
    }

    pub fn get(&self, field: &str) -> Option<&ModelValue> {
        self.fields.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut ModelValue> {
        self.fields.get_mut(field)
    }

    /// String or enum text of a field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(ModelValue::as_str)
    }

    pub fn get_record(&self, field: &str) -> Option<&Record> {
        self.get(field).and_then(ModelValue::as_record)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<ModelValue>) -> Option<ModelValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<ModelValue> {
        self.fields.shift_remove(field)
    }

    /// True when the field is present, including when it is `Null`.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &ModelValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
