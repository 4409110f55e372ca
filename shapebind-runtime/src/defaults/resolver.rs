//! Merges configured defaults into operation inputs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use shapebind_model::{EnumValue, ModelValue, Record, ScalarType, ShapeGraph, ShapeId, ShapeKind};

use super::document::merge_objects;
use super::{DefaultsDocument, DefaultsError};

/// Applies a [`DefaultsDocument`] to inputs of one shape graph.
///
/// Defaults only ever fill fields the caller left absent. A field the caller
/// set, even to `Null` or an empty collection, is kept as is.
#[derive(Debug, Clone, Copy)]
pub struct DefaultsResolver<'a> {
    document: &'a DefaultsDocument,
    graph: &'a ShapeGraph,
}

impl<'a> DefaultsResolver<'a> {
    pub fn new(document: &'a DefaultsDocument, graph: &'a ShapeGraph) -> Self {
        Self { document, graph }
    }

    /// Global defaults with the resource's own defaults merged on top.
    pub fn layered(&self, resource: Option<&str>) -> Map<String, Value> {
        let mut layered = self.document.global.clone();
        if let Some(own) = resource.and_then(|name| self.document.per_resource.get(name)) {
            merge_objects(&mut layered, own.clone());
        }
        layered
    }

    /// Fill absent fields of `input` from the layered defaults.
    pub fn resolve(
        &self,
        resource: Option<&str>,
        input_shape: ShapeId,
        mut input: Record,
    ) -> Result<Record, DefaultsError> {
        let layered = self.layered(resource);
        if layered.is_empty() {
            return Ok(input);
        }
        let root = self.graph.shape(input_shape).name.clone();
        let mut skipped = Vec::new();
        self.fill_record(&mut input, input_shape, &layered, &root, &mut skipped)?;
        Ok(input)
    }

    /// Fill absent members of `record` from `defaults`.
    ///
    /// Structure defaults are walked member by member whether or not the
    /// caller set the parent, so a nested path naming no member of the shape
    /// is skipped (and pushed onto `skipped`) rather than rejected. Only a
    /// value of the wrong kind fails.
    pub(crate) fn fill_record(
        &self,
        record: &mut Record,
        shape: ShapeId,
        defaults: &Map<String, Value>,
        path: &str,
        skipped: &mut Vec<String>,
    ) -> Result<(), DefaultsError> {
        let node = self.graph.shape(shape);
        for (field, default) in defaults {
            let field_path = format!("{}.{}", path, field);
            let Some(member) = node.member(field) else {
                log::debug!("Default {} does not apply to {}", field_path, node.name);
                skipped.push(field_path);
                continue;
            };

            if !record.contains(field) {
                let member_node = self.graph.shape(member.shape);
                let value = match (default, member_node.is_structure()) {
                    (Value::Object(nested_defaults), true) => {
                        let mut nested = Record::of(member_node.name.clone());
                        self.fill_record(&mut nested, member.shape, nested_defaults, &field_path, skipped)?;
                        if nested.is_empty() && !nested_defaults.is_empty() {
                            continue;
                        }
                        ModelValue::Record(nested)
                    }
                    _ => coerce_default(self.graph, default, member.shape, &field_path)?,
                };
                log::trace!("Applied default for {}", field_path);
                record.set(field.clone(), value);
                continue;
            }

            match record.get_mut(field) {
                Some(ModelValue::Record(nested)) => {
                    if let Value::Object(nested_defaults) = default {
                        self.fill_record(nested, member.shape, nested_defaults, &field_path, skipped)?;
                    }
                }
                Some(ModelValue::Map(entries)) => {
                    if let (Value::Object(map_defaults), ShapeKind::Map { value, .. }) =
                        (default, &self.graph.shape(member.shape).kind)
                    {
                        for (key, entry) in map_defaults {
                            if !entries.contains_key(key) {
                                let entry_path = format!("{}[{}]", field_path, key);
                                let coerced = coerce_default(self.graph, entry, *value, &entry_path)?;
                                entries.insert(key.clone(), coerced);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Convert a JSON default into a model value of `shape`.
pub(crate) fn coerce_default(
    graph: &ShapeGraph,
    value: &Value,
    shape: ShapeId,
    path: &str,
) -> Result<ModelValue, DefaultsError> {
    if value.is_null() {
        return Ok(ModelValue::Null);
    }
    let node = graph.shape(shape);
    let invalid = |reason: String| DefaultsError::InvalidDefault {
        path: path.to_string(),
        reason,
    };
    let mismatch = || invalid(format!("expected {}, found {}", node.kind_name(), json_kind(value)));

    match &node.kind {
        ShapeKind::Structure { .. } => {
            let Value::Object(entries) = value else {
                return Err(mismatch());
            };
            let mut record = Record::of(node.name.clone());
            for (field, entry) in entries {
                let member = node
                    .member(field)
                    .ok_or_else(|| invalid(format!("{} has no field {}", node.name, field)))?;
                let nested = coerce_default(graph, entry, member.shape, &format!("{}.{}", path, field))?;
                record.set(field.clone(), nested);
            }
            Ok(ModelValue::Record(record))
        }
        ShapeKind::List { element } => {
            let Value::Array(items) = value else {
                return Err(mismatch());
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_default(graph, item, *element, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(ModelValue::List)
        }
        ShapeKind::Map { value: value_shape, .. } => {
            let Value::Object(entries) = value else {
                return Err(mismatch());
            };
            let mut map = IndexMap::with_capacity(entries.len());
            for (key, entry) in entries {
                let coerced = coerce_default(graph, entry, *value_shape, &format!("{}[{}]", path, key))?;
                map.insert(key.clone(), coerced);
            }
            Ok(ModelValue::Map(map))
        }
        ShapeKind::Scalar(scalar) => match (scalar, value) {
            (ScalarType::String, Value::String(text)) => Ok(ModelValue::String(text.clone())),
            (ScalarType::Boolean, Value::Bool(flag)) => Ok(ModelValue::Bool(*flag)),
            (ScalarType::Integer | ScalarType::Long, Value::Number(number)) => number
                .as_i64()
                .map(ModelValue::Integer)
                .ok_or_else(mismatch),
            (ScalarType::Float | ScalarType::Double, Value::Number(number)) => number
                .as_f64()
                .map(ModelValue::Float)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ShapeKind::Enum { values, closed } => {
            let Value::String(text) = value else {
                return Err(mismatch());
            };
            if values.iter().any(|v| v == text) {
                Ok(ModelValue::Enum(EnumValue::Known(text.clone())))
            } else if *closed {
                Err(invalid(format!(
                    "'{}' is not one of {}",
                    text,
                    values.join(", ")
                )))
            } else {
                Ok(ModelValue::Enum(EnumValue::Unknown(text.clone())))
            }
        }
        ShapeKind::Blob => {
            let Value::String(encoded) = value else {
                return Err(mismatch());
            };
            STANDARD
                .decode(encoded)
                .map(ModelValue::Blob)
                .map_err(|e| invalid(format!("invalid base64: {}", e)))
        }
        ShapeKind::Timestamp => parse_timestamp(value)
            .map(ModelValue::Timestamp)
            .ok_or_else(mismatch),
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Value::Number(number) => number
            .as_i64()
            .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
