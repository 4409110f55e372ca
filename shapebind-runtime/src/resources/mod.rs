//! Resource model derived from operation naming.
//!
//! A resource is a noun (`TrainingJob`) together with the operations that
//! create, describe, update, delete and list it, the fields that address one
//! instance and, optionally, the enum field that reports its lifecycle status.

mod derive;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use shapebind_model::ShapeId;
use thiserror::Error;

pub use derive::derive_resources;

/// Lifecycle verb of a resource operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Create,
    Get,
    Update,
    Delete,
    List,
    /// Any other action, by snake_case method name (e.g. "stop")
    Custom(String),
}

impl Verb {
    /// Method name exposed on resource handles.
    pub fn method_name(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Operation bound to a verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationBinding {
    pub verb: Verb,
    pub operation: String,
    pub input: Option<ShapeId>,
    pub output: Option<ShapeId>,
}

/// Field that addresses one instance of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierField {
    pub wire_name: String,
    pub model_name: String,
}

/// Pagination layout of a list operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBinding {
    pub operation: String,
    /// Model name of the output member holding the page items
    pub items_field: String,
    pub item_shape: ShapeId,
    /// Model name of the continuation token on the input, if paginated
    pub input_token: Option<String>,
    /// Model name of the continuation token on the output, if paginated
    pub output_token: Option<String>,
}

/// Enum field on the get output that reports lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusField {
    pub model_name: String,
    pub shape: ShapeId,
    pub values: Vec<String>,
    pub success_values: BTreeSet<String>,
    pub failure_values: BTreeSet<String>,
}

impl StatusField {
    pub fn is_success(&self, status: &str) -> bool {
        self.success_values.contains(status)
    }

    pub fn is_failure(&self, status: &str) -> bool {
        self.failure_values.contains(status)
    }

    pub fn is_known(&self, status: &str) -> bool {
        self.values.iter().any(|value| value == status)
    }
}

/// Resource derived from a shape graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition {
    pub name: String,
    pub identifiers: Vec<IdentifierField>,
    pub operations: BTreeMap<Verb, OperationBinding>,
    pub list: Option<ListBinding>,
    pub status: Option<StatusField>,
    /// Model name of a failure reason member on the get output
    pub failure_reason: Option<String>,
}

impl ResourceDefinition {
    pub fn operation(&self, verb: &Verb) -> Option<&OperationBinding> {
        self.operations.get(verb)
    }

    pub fn supports(&self, verb: &Verb) -> bool {
        self.operations.contains_key(verb)
    }

    /// Custom verbs in name order.
    pub fn custom_verbs(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().filter_map(|verb| match verb {
            Verb::Custom(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// True when the resource can only be listed.
    pub fn is_list_only(&self) -> bool {
        self.operations.len() == 1 && self.supports(&Verb::List)
    }
}

/// Resource that could not be bound, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported resource {name}: {reason}")]
pub struct UnsupportedResource {
    pub name: String,
    pub reason: String,
}

/// Every resource derived from one shape graph
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: BTreeMap<String, ResourceDefinition>,
    unsupported: Vec<UnsupportedResource>,
}

impl ResourceCatalog {
    pub(crate) fn new(
        resources: BTreeMap<String, ResourceDefinition>,
        unsupported: Vec<UnsupportedResource>,
    ) -> Self {
        Self {
            resources,
            unsupported,
        }
    }

    /// Derive resources from every operation of the graph.
    pub fn derive(graph: &shapebind_model::ShapeGraph) -> Self {
        derive_resources(graph, &graph.operation_names())
    }

    /// Look up a resource, explaining why when it is not available.
    pub fn get(&self, name: &str) -> Result<&ResourceDefinition, UnsupportedResource> {
        if let Some(resource) = self.resources.get(name) {
            return Ok(resource);
        }
        if let Some(unsupported) = self.unsupported.iter().find(|u| u.name == name) {
            return Err(unsupported.clone());
        }

        let suggestion = closest_name(name, self.resources.keys().map(String::as_str));
        Err(UnsupportedResource {
            name: name.to_string(),
            reason: suggestion.map_or_else(
                || "no such resource in the service description".to_string(),
                |s| format!("no such resource in the service description, did you mean {}?", s),
            ),
        })
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn unsupported(&self) -> &[UnsupportedResource] {
        &self.unsupported
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Closest candidate by Jaro-Winkler similarity, if reasonably close.
pub(crate) fn closest_name<'a>(
    name: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<&'a str> {
    candidates
        .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
