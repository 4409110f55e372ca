//! Defaults document model and loading.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shapebind_model::{Record, ShapeGraph};

use super::resolver::coerce_default;
use super::DefaultsResolver;
use super::DefaultsError;
use crate::resources::{ResourceCatalog, Verb};

/// Environment variable naming the defaults file (JSON or TOML).
pub const DEFAULTS_PATH_ENV: &str = "SHAPEBIND_DEFAULTS_PATH";

/// Only document version understood by this crate.
pub const SUPPORTED_VERSION: &str = "1.0";

fn default_version() -> String {
    SUPPORTED_VERSION.to_string()
}

/// Global and per-resource default values.
///
/// Keys are model field names; nested objects address nested fields, and a
/// dotted key such as `"vpc_config.subnets"` is expanded into nested objects
/// on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[schemars(description = "Default values for operation inputs, keyed by model field names.")]
pub struct DefaultsDocument {
    #[serde(default = "default_version")]
    pub version: String,
    /// Applied to every operation input that has a matching field
    #[serde(default)]
    pub global: Map<String, Value>,
    /// Resource name to defaults for that resource's inputs
    #[serde(default)]
    pub per_resource: BTreeMap<String, Map<String, Value>>,
}

impl Default for DefaultsDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            global: Map::new(),
            per_resource: BTreeMap::new(),
        }
    }
}

impl DefaultsDocument {
    pub fn from_json_str(text: &str) -> Result<Self, DefaultsError> {
        let document: Self =
            serde_json::from_str(text).map_err(|e| DefaultsError::Parse(e.to_string()))?;
        document.normalize()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, DefaultsError> {
        let document: Self = toml::from_str(text).map_err(|e| DefaultsError::Parse(e.to_string()))?;
        document.normalize()
    }

    /// Load a document, choosing the format by file extension.
    pub fn from_path(path: &Path) -> Result<Self, DefaultsError> {
        if !path.exists() {
            return Err(DefaultsError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| DefaultsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        log::debug!("Loading defaults from {}", path.display());
        if is_toml {
            Self::from_toml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    /// Load the document named by [`DEFAULTS_PATH_ENV`]; empty when unset.
    pub fn from_env() -> Result<Self, DefaultsError> {
        match std::env::var_os(DEFAULTS_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::from_path(Path::new(&path)),
            _ => {
                log::debug!("{} is not set; no defaults configured", DEFAULTS_PATH_ENV);
                Ok(Self::default())
            }
        }
    }

    /// JSON Schema of the document format.
    pub fn json_schema() -> Value {
        schemars::schema_for!(DefaultsDocument).to_value()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.per_resource.values().all(Map::is_empty)
    }

    fn normalize(mut self) -> Result<Self, DefaultsError> {
        if self.version != SUPPORTED_VERSION {
            return Err(DefaultsError::UnsupportedVersion(self.version));
        }
        self.global = expand_dotted(std::mem::take(&mut self.global));
        for defaults in self.per_resource.values_mut() {
            *defaults = expand_dotted(std::mem::take(defaults));
        }
        Ok(self)
    }

    /// Check the document against the resources of a service.
    ///
    /// Every per-resource entry must name a derived resource and coerce
    /// against its create (or update) input. A global entry is applied to
    /// every operation input that has the field, the same way the resolver
    /// applies it: a value of the wrong kind for any of them fails, and so
    /// does a nested path that none of them has. Global entries that match no
    /// operation input are reported at warn level only.
    pub fn validate(&self, graph: &ShapeGraph, catalog: &ResourceCatalog) -> Result<(), DefaultsError> {
        if self.version != SUPPORTED_VERSION {
            return Err(DefaultsError::UnsupportedVersion(self.version.clone()));
        }

        for (name, defaults) in &self.per_resource {
            let resource = catalog
                .get(name)
                .map_err(|e| DefaultsError::SchemaValidation(e.to_string()))?;
            let Some(input) = resource
                .operation(&Verb::Create)
                .or_else(|| resource.operation(&Verb::Update))
                .and_then(|bound| bound.input)
            else {
                log::warn!("Defaults for {} ignored: resource has no create or update input", name);
                continue;
            };
            let input_node = graph.shape(input);
            for (field, value) in defaults {
                let member = input_node.member(field).ok_or_else(|| {
                    DefaultsError::SchemaValidation(format!(
                        "{} is not an input field of {} ({})",
                        field, name, input_node.name
                    ))
                })?;
                coerce_default(graph, value, member.shape, &format!("perResource.{}.{}", name, field))?;
            }
        }

        let resolver = DefaultsResolver::new(self, graph);
        for (field, value) in &self.global {
            let entry = Map::from_iter([(field.clone(), value.clone())]);
            let mut unmatched: Option<BTreeSet<String>> = None;
            for input in graph.operations().filter_map(|operation| operation.input) {
                let input_node = graph.shape(input);
                if input_node.member(field).is_none() {
                    continue;
                }
                let mut skipped = Vec::new();
                let mut filled = Record::of(input_node.name.clone());
                resolver
                    .fill_record(&mut filled, input, &entry, "global", &mut skipped)
                    .map_err(|e| match e {
                        DefaultsError::InvalidDefault { path, reason } => DefaultsError::InvalidDefault {
                            path,
                            reason: format!("{} (in {})", reason, input_node.name),
                        },
                        other => other,
                    })?;
                let skipped: BTreeSet<String> = skipped.into_iter().collect();
                unmatched = Some(match unmatched {
                    Some(previous) => previous.intersection(&skipped).cloned().collect(),
                    None => skipped,
                });
            }
            match unmatched {
                None => log::warn!("Global default {} matches no operation input", field),
                Some(paths) => {
                    if let Some(path) = paths.into_iter().next() {
                        return Err(DefaultsError::SchemaValidation(format!(
                            "{} matches no member of any operation input",
                            path
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Expand dotted keys into nested objects, merging with existing objects.
fn expand_dotted(entries: Map<String, Value>) -> Map<String, Value> {
    let mut expanded = Map::new();
    for (key, value) in entries {
        let value = match value {
            Value::Object(nested) => Value::Object(expand_dotted(nested)),
            other => other,
        };
        let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
        insert_path(&mut expanded, &segments, value);
    }
    expanded
}

fn insert_path(target: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        match (target.get_mut(*first), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge_objects(existing, incoming),
            (_, value) => {
                target.insert((*first).to_string(), value);
            }
        }
        return;
    }
    let slot = target
        .entry((*first).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(nested) = slot {
        insert_path(nested, rest, value);
    }
}

/// Deep merge `incoming` into `existing`; `incoming` wins on conflicts.
pub(crate) fn merge_objects(existing: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match (existing.get_mut(&key), value) {
            (Some(Value::Object(current)), Value::Object(nested)) => merge_objects(current, nested),
            (_, value) => {
                existing.insert(key, value);
            }
        }
    }
}
