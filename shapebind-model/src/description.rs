//! Service description document
//!
//! Serde model of a `service-2.json` style API description: service metadata,
//! operations with their input/output/error shape references, and the flat
//! table of named shapes. Only the fields the shape graph needs are captured;
//! documentation, HTTP bindings and examples are ignored during deserialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::providers::JsonProvider;

/// Complete service description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceDescription {
    #[serde(default)]
    pub metadata: ServiceMetadata,
    #[serde(default)]
    pub operations: IndexMap<String, OperationSpec>,
    #[serde(default)]
    pub shapes: IndexMap<String, ShapeSpec>,
}

impl ServiceDescription {
    /// Parse a description from JSON text.
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        JsonProvider::parse(json_str)
    }

    /// Parse a description from raw JSON bytes (e.g. embedded files).
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        JsonProvider::parse_slice(bytes)
    }
}

/// Service level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub protocol: Option<String>,
}

/// Reference to a named shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeRef {
    pub shape: String,
}

/// One operation of the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Operation name (PascalCase, e.g., "CreateModel")
    pub name: String,
    #[serde(default)]
    pub input: Option<ShapeRef>,
    #[serde(default)]
    pub output: Option<ShapeRef>,
    #[serde(default)]
    pub errors: Vec<ShapeRef>,
}

/// Raw shape definition as it appears in the description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeSpec {
    #[serde(rename = "type")]
    pub shape_type: String,
    #[serde(default)]
    pub members: IndexMap<String, ShapeRef>,
    #[serde(default)]
    pub required: Vec<String>,
    /// List element
    #[serde(default)]
    pub member: Option<ShapeRef>,
    /// Map key
    #[serde(default)]
    pub key: Option<ShapeRef>,
    /// Map value
    #[serde(default)]
    pub value: Option<ShapeRef>,
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    /// Error shapes carry an `exception` marker
    #[serde(default)]
    pub exception: bool,
}
