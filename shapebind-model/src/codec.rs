//! Structural codec between [`ModelValue`] and [`WireValue`].
//!
//! Conversion recurses over the [`ShapeGraph`]: structures map member names
//! through the names precomputed on each [`Member`](crate::Member), lists and
//! maps recurse uniformly at any depth, blobs pass through untouched.
//! Encoding validates (required members, closed enums, unknown fields);
//! decoding is lenient (unknown wire keys are skipped, unknown enum values are
//! kept as [`EnumValue::Unknown`]).

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;

use crate::errors::{ModelError, Result};
use crate::shape_graph::{ScalarType, ShapeGraph, ShapeId, ShapeKind};
use crate::value::{EnumValue, ModelValue, Record, WireValue};

/// Default recursion limit
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Maximum nesting depth before conversion fails
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Field(String),
    Index(usize),
    Key(String),
}

/// Location inside the value being converted, rendered in error messages as
/// `CreateModelInput.vpc_config.subnets[1]`.
#[derive(Debug)]
struct Path<'a> {
    root: &'a str,
    segments: Vec<Segment>,
}

impl<'a> Path<'a> {
    fn new(root: &'a str) -> Self {
        Self {
            root,
            segments: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        self.segments.len()
    }

    fn render(&self) -> String {
        let mut rendered = self.root.to_string();
        for segment in &self.segments {
            // Writing to a String cannot fail.
            let _ = match segment {
                Segment::Field(name) => write!(rendered, ".{}", name),
                Segment::Index(index) => write!(rendered, "[{}]", index),
                Segment::Key(key) => write!(rendered, "[\"{}\"]", key),
            };
        }
        rendered
    }

    fn render_with(&mut self, segment: Segment) -> String {
        self.segments.push(segment);
        let rendered = self.render();
        self.segments.pop();
        rendered
    }
}

/// Codec bound to one shape graph
#[derive(Debug, Clone, Copy)]
pub struct Codec<'g> {
    graph: &'g ShapeGraph,
    options: CodecOptions,
}

impl<'g> Codec<'g> {
    pub fn new(graph: &'g ShapeGraph) -> Self {
        Self::with_options(graph, CodecOptions::default())
    }

    pub fn with_options(graph: &'g ShapeGraph, options: CodecOptions) -> Self {
        Self { graph, options }
    }

    pub fn graph(&self) -> &'g ShapeGraph {
        self.graph
    }

    /// Convert a model value to wire format against `shape`.
    pub fn encode(&self, value: &ModelValue, shape: ShapeId) -> Result<WireValue> {
        let mut path = Path::new(&self.graph.shape(shape).name);
        self.encode_at(value, shape, &mut path)
    }

    /// Encode a record against a structure shape.
    pub fn encode_record(&self, record: &Record, shape: ShapeId) -> Result<WireValue> {
        let mut path = Path::new(&self.graph.shape(shape).name);
        self.encode_structure(record, shape, &mut path)
    }

    /// Convert a wire value to model format against `shape`.
    ///
    /// Decoded values are canonical: enum shapes yield [`ModelValue::Enum`],
    /// blob shapes yield [`ModelValue::Blob`] and absent members are left
    /// unset. Encoding also accepts a plain string at an enum or blob shape
    /// and an explicit [`ModelValue::Null`] member, so `decode(encode(v))`
    /// equals `v` only once `v` is in canonical form.
    pub fn decode(&self, wire: &WireValue, shape: ShapeId) -> Result<ModelValue> {
        let mut path = Path::new(&self.graph.shape(shape).name);
        self.decode_at(wire, shape, &mut path)
    }

    /// Decode a wire object against a structure shape.
    pub fn decode_record(&self, wire: &WireValue, shape: ShapeId) -> Result<Record> {
        match self.decode(wire, shape)? {
            ModelValue::Record(record) => Ok(record),
            ModelValue::Null => Ok(Record::of(self.graph.shape(shape).name.clone())),
            other => Err(ModelError::type_mismatch(
                "record",
                other.kind_name(),
                self.graph.shape(shape).name.clone(),
            )),
        }
    }

    fn check_depth(&self, path: &Path<'_>) -> Result<()> {
        if path.depth() > self.options.max_depth {
            return Err(ModelError::DepthLimitExceeded {
                limit: self.options.max_depth,
                path: path.render(),
            });
        }
        Ok(())
    }

    fn encode_at(&self, value: &ModelValue, id: ShapeId, path: &mut Path<'_>) -> Result<WireValue> {
        self.check_depth(path)?;
        let node = self.graph.shape(id);

        let wire = match (&node.kind, value) {
            (_, ModelValue::Null) => WireValue::Null,
            (ShapeKind::Structure { .. }, ModelValue::Record(record)) => {
                self.encode_structure(record, id, path)?
            }
            (ShapeKind::List { element }, ModelValue::List(items)) => {
                let mut encoded = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.segments.push(Segment::Index(index));
                    encoded.push(self.encode_at(item, *element, path)?);
                    path.segments.pop();
                }
                WireValue::List(encoded)
            }
            (ShapeKind::Map { value: value_shape, .. }, ModelValue::Map(entries)) => {
                let mut encoded = IndexMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    path.segments.push(Segment::Key(key.clone()));
                    encoded.insert(key.clone(), self.encode_at(entry, *value_shape, path)?);
                    path.segments.pop();
                }
                WireValue::Object(encoded)
            }
            (
                ShapeKind::Enum { values, closed },
                ModelValue::Enum(_) | ModelValue::String(_),
            ) => {
                let text = value.as_str().unwrap_or_default();
                if *closed && !values.iter().any(|v| v == text) {
                    return Err(ModelError::invalid_enum(&node.name, text, values.as_slice(), path.render()));
                }
                WireValue::String(text.to_string())
            }
            (ShapeKind::Scalar(ScalarType::String), ModelValue::String(text)) => {
                WireValue::String(text.clone())
            }
            (
                ShapeKind::Scalar(ScalarType::Integer | ScalarType::Long),
                ModelValue::Integer(number),
            ) => WireValue::Integer(*number),
            (ShapeKind::Scalar(ScalarType::Float | ScalarType::Double), ModelValue::Float(number)) => {
                WireValue::Float(*number)
            }
            (
                ShapeKind::Scalar(ScalarType::Float | ScalarType::Double),
                ModelValue::Integer(number),
            ) => WireValue::Float(*number as f64),
            (ShapeKind::Scalar(ScalarType::Boolean), ModelValue::Bool(flag)) => WireValue::Bool(*flag),
            (ShapeKind::Blob, ModelValue::Blob(bytes)) => WireValue::Blob(bytes.clone()),
            (ShapeKind::Blob, ModelValue::String(text)) => WireValue::Blob(text.as_bytes().to_vec()),
            (ShapeKind::Timestamp, ModelValue::Timestamp(at)) => WireValue::Timestamp(*at),
            (_, other) => {
                return Err(ModelError::type_mismatch(
                    node.kind_name(),
                    other.kind_name(),
                    path.render(),
                ))
            }
        };
        Ok(wire)
    }

    fn encode_structure(&self, record: &Record, id: ShapeId, path: &mut Path<'_>) -> Result<WireValue> {
        let node = self.graph.shape(id);
        if !node.is_structure() {
            return Err(ModelError::type_mismatch(node.kind_name(), "record", path.render()));
        }
        if let Some(shape) = record.shape() {
            if shape != node.name {
                return Err(ModelError::type_mismatch(&node.name, shape, path.render()));
            }
        }
        if let Some((field, _)) = record.fields().find(|(field, _)| node.member(field).is_none()) {
            return Err(ModelError::UnknownField {
                shape: node.name.clone(),
                field: field.clone(),
                path: path.render(),
            });
        }

        let mut encoded = IndexMap::new();
        for member in node.members() {
            match record.get(&member.model_name) {
                Some(value) if !value.is_null() => {
                    path.segments.push(Segment::Field(member.model_name.clone()));
                    let wire = self.encode_at(value, member.shape, path)?;
                    path.segments.pop();
                    encoded.insert(member.wire_name.clone(), wire);
                }
                _ if member.required => {
                    return Err(ModelError::MissingRequiredField {
                        shape: node.name.clone(),
                        field: member.model_name.clone(),
                        path: path.render_with(Segment::Field(member.model_name.clone())),
                    });
                }
                _ => {}
            }
        }
        Ok(WireValue::Object(encoded))
    }

    fn decode_at(&self, wire: &WireValue, id: ShapeId, path: &mut Path<'_>) -> Result<ModelValue> {
        self.check_depth(path)?;
        let node = self.graph.shape(id);

        let value = match (&node.kind, wire) {
            (_, WireValue::Null) => ModelValue::Null,
            (ShapeKind::Structure { members }, WireValue::Object(fields)) => {
                let mut record = Record::of(node.name.clone());
                for member in members {
                    if let Some(field) = fields.get(&member.wire_name) {
                        path.segments.push(Segment::Field(member.model_name.clone()));
                        let decoded = self.decode_at(field, member.shape, path)?;
                        path.segments.pop();
                        record.set(member.model_name.clone(), decoded);
                    }
                }
                for key in fields.keys() {
                    if node.member_by_wire(key).is_none() {
                        log::trace!("Skipping unknown field {} of shape {}", key, node.name);
                    }
                }
                ModelValue::Record(record)
            }
            (ShapeKind::List { element }, WireValue::List(items)) => {
                let mut decoded = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.segments.push(Segment::Index(index));
                    decoded.push(self.decode_at(item, *element, path)?);
                    path.segments.pop();
                }
                ModelValue::List(decoded)
            }
            (ShapeKind::Map { value: value_shape, .. }, WireValue::Object(entries)) => {
                let mut decoded = IndexMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    path.segments.push(Segment::Key(key.clone()));
                    decoded.insert(key.clone(), self.decode_at(entry, *value_shape, path)?);
                    path.segments.pop();
                }
                ModelValue::Map(decoded)
            }
            (ShapeKind::Enum { values, .. }, WireValue::String(text)) => {
                if values.iter().any(|v| v == text) {
                    ModelValue::Enum(EnumValue::Known(text.clone()))
                } else {
                    log::debug!("Unknown value '{}' for enum {}", text, node.name);
                    ModelValue::Enum(EnumValue::Unknown(text.clone()))
                }
            }
            (ShapeKind::Scalar(ScalarType::String), WireValue::String(text)) => {
                ModelValue::String(text.clone())
            }
            (
                ShapeKind::Scalar(ScalarType::Integer | ScalarType::Long),
                WireValue::Integer(number),
            ) => ModelValue::Integer(*number),
            (ShapeKind::Scalar(ScalarType::Float | ScalarType::Double), WireValue::Float(number)) => {
                ModelValue::Float(*number)
            }
            (
                ShapeKind::Scalar(ScalarType::Float | ScalarType::Double),
                WireValue::Integer(number),
            ) => ModelValue::Float(*number as f64),
            (ShapeKind::Scalar(ScalarType::Boolean), WireValue::Bool(flag)) => ModelValue::Bool(*flag),
            (ShapeKind::Blob, WireValue::Blob(bytes)) => ModelValue::Blob(bytes.clone()),
            (ShapeKind::Blob, WireValue::String(text)) => ModelValue::Blob(text.as_bytes().to_vec()),
            (ShapeKind::Timestamp, other) => {
                ModelValue::Timestamp(decode_timestamp(other).ok_or_else(|| {
                    ModelError::type_mismatch("timestamp", other.kind_name(), path.render())
                })?)
            }
            (_, other) => {
                return Err(ModelError::type_mismatch(
                    node.kind_name(),
                    other.kind_name(),
                    path.render(),
                ))
            }
        };
        Ok(value)
    }
}

/// Timestamps arrive as native values, epoch seconds or RFC 3339 text.
fn decode_timestamp(wire: &WireValue) -> Option<DateTime<Utc>> {
    match wire {
        WireValue::Timestamp(at) => Some(*at),
        WireValue::Integer(seconds) => Utc.timestamp_opt(*seconds, 0).single(),
        WireValue::Float(seconds) => {
            let millis = (seconds * 1000.0).round() as i64;
            Utc.timestamp_millis_opt(millis).single()
        }
        WireValue::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        _ => None,
    }
}
