//! Groups operations into resources by their names.
//!
//! Nouns come from creation-style operations (`CreateTrainingJob` ->
//! `TrainingJob`). Each noun, longest first, claims the unclaimed operations
//! named `<Verb><Noun>` or `List<Nouns>`. List operations left over afterwards
//! yield list-only resources. Names that do not line up are left unclaimed;
//! no other linking rule is attempted.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use convert_case::{Case, Casing};
use indexmap::IndexSet;
use regex::Regex;
use shapebind_model::{to_model_name, ShapeGraph, ShapeId, ShapeKind, ShapeNode};

use super::{
    IdentifierField, ListBinding, OperationBinding, ResourceCatalog, ResourceDefinition,
    StatusField, UnsupportedResource, Verb,
};

/// Creation prefixes in priority order; the first one present acts as create.
const CREATE_PREFIXES: [&str; 5] = ["Create", "Add", "Start", "Register", "Import"];

/// Status values that end a wait successfully, matched case-insensitively.
const SUCCESS_KEYWORDS: [&str; 8] = [
    "completed",
    "succeeded",
    "inservice",
    "active",
    "available",
    "ready",
    "created",
    "stopped",
];

const FAILURE_KEYWORD: &str = "failed";

static CREATE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static VERB_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn create_pattern() -> Option<&'static Regex> {
    CREATE_PATTERN
        .get_or_init(|| Regex::new(r"^(Create|Add|Start|Register|Import)([A-Z][A-Za-z0-9]*)$").ok())
        .as_ref()
}

/// A single capitalized word, e.g. "Describe".
fn verb_pattern() -> Option<&'static Regex> {
    VERB_PATTERN
        .get_or_init(|| Regex::new(r"^[A-Z][a-z]+$").ok())
        .as_ref()
}

fn plurals(noun: &str) -> Vec<String> {
    let mut forms = vec![format!("{}s", noun), format!("{}es", noun)];
    if let Some(stem) = noun.strip_suffix('y') {
        forms.push(format!("{}ies", stem));
    }
    forms
}

fn singular(plural: &str) -> Option<String> {
    if let Some(stem) = plural.strip_suffix("ies") {
        return Some(format!("{}y", stem));
    }
    for suffix in ["sses", "shes", "ches", "xes"] {
        if plural.ends_with(suffix) {
            return Some(plural[..plural.len() - 2].to_string());
        }
    }
    plural
        .strip_suffix('s')
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// Verb prefix of an operation claimed by `noun`, or `None` if not claimed.
fn claim(operation: &str, noun: &str) -> Option<String> {
    if let Some(rest) = operation.strip_prefix("List") {
        if plurals(noun).iter().any(|plural| plural == rest) {
            return Some("List".to_string());
        }
    }
    operation
        .strip_suffix(noun)
        .filter(|prefix| verb_pattern().is_some_and(|pattern| pattern.is_match(prefix)))
        .map(str::to_string)
}

fn classify(prefix: &str) -> Verb {
    match prefix {
        "Create" => Verb::Create,
        "Describe" | "Get" => Verb::Get,
        "Update" => Verb::Update,
        "Delete" | "Deregister" => Verb::Delete,
        "List" => Verb::List,
        other => Verb::Custom(other.to_case(Case::Snake)),
    }
}

fn binding(graph: &ShapeGraph, verb: Verb, operation: &str) -> Option<OperationBinding> {
    graph.operation(operation).map(|resolved| OperationBinding {
        verb,
        operation: resolved.name.clone(),
        input: resolved.input,
        output: resolved.output,
    })
}

/// Derive the resource catalog for `operations` of `graph`.
pub fn derive_resources(graph: &ShapeGraph, operations: &[&str]) -> ResourceCatalog {
    let mut unclaimed: IndexSet<&str> = operations.iter().copied().collect();

    let mut nouns: Vec<String> = unclaimed
        .iter()
        .filter_map(|operation| create_pattern().and_then(|pattern| pattern.captures(operation)))
        .filter_map(|captures| captures.get(2).map(|noun| noun.as_str().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    nouns.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut claimed: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    claim_all(&nouns, &mut unclaimed, &mut claimed);

    let mut list_nouns: Vec<String> = unclaimed
        .iter()
        .filter_map(|operation| operation.strip_prefix("List"))
        .filter_map(singular)
        .filter(|noun| !claimed.contains_key(noun))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    list_nouns.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    claim_all(&list_nouns, &mut unclaimed, &mut claimed);

    let mut resources = BTreeMap::new();
    let mut unsupported = Vec::new();
    for (noun, actions) in claimed {
        match build_resource(graph, &noun, &actions) {
            Ok(resource) => {
                resources.insert(noun, resource);
            }
            Err(reason) => {
                log::warn!("Coverage gap: resource {} is not supported: {}", noun, reason);
                unsupported.push(UnsupportedResource { name: noun, reason });
            }
        }
    }

    if !unclaimed.is_empty() {
        log::debug!(
            "Operations not bound to any resource: {}",
            unclaimed.iter().copied().collect::<Vec<_>>().join(", ")
        );
    }
    log::info!(
        "Derived {} resources ({} unsupported) from {} operations",
        resources.len(),
        unsupported.len(),
        operations.len()
    );

    ResourceCatalog::new(resources, unsupported)
}

fn claim_all(
    nouns: &[String],
    unclaimed: &mut IndexSet<&str>,
    claimed: &mut BTreeMap<String, Vec<(String, String)>>,
) {
    for noun in nouns {
        let actions: Vec<(String, String)> = unclaimed
            .iter()
            .filter_map(|operation| claim(operation, noun).map(|prefix| (prefix, (*operation).to_string())))
            .collect();
        if actions.is_empty() {
            continue;
        }
        for (_, operation) in &actions {
            unclaimed.shift_remove(operation.as_str());
        }
        claimed.insert(noun.clone(), actions);
    }
}

fn build_resource(
    graph: &ShapeGraph,
    noun: &str,
    actions: &[(String, String)],
) -> Result<ResourceDefinition, String> {
    let mut operations: BTreeMap<Verb, OperationBinding> = BTreeMap::new();
    for (prefix, operation) in actions {
        let mut verb = classify(prefix);
        if operations.contains_key(&verb) {
            log::debug!("{} already has a {} operation; binding {} as custom", noun, verb, operation);
            verb = Verb::Custom(prefix.to_case(Case::Snake));
        }
        if let Some(bound) = binding(graph, verb.clone(), operation) {
            operations.insert(verb, bound);
        }
    }

    if !operations.contains_key(&Verb::Create) {
        let fallback = CREATE_PREFIXES[1..]
            .iter()
            .find_map(|prefix| operations.remove(&Verb::Custom(prefix.to_case(Case::Snake))));
        if let Some(mut create) = fallback {
            create.verb = Verb::Create;
            operations.insert(Verb::Create, create);
        }
    }

    let list = match operations.get(&Verb::List) {
        Some(bound) => {
            let layout = list_binding(graph, bound);
            if layout.is_none() {
                log::warn!("{} has no item list; dropping list support for {}", bound.operation, noun);
                operations.remove(&Verb::List);
            }
            layout
        }
        None => None,
    };

    let identifiers = identifier_fields(graph, &operations, list.as_ref())?;

    let get_output = operations
        .get(&Verb::Get)
        .and_then(|bound| bound.output)
        .map(|id| graph.shape(id));
    let status = get_output.and_then(|output| status_field(graph, noun, output));
    let failure_reason = get_output
        .and_then(|output| output.member("failure_reason"))
        .map(|member| member.model_name.clone());

    Ok(ResourceDefinition {
        name: noun.to_string(),
        identifiers,
        operations,
        list,
        status,
        failure_reason,
    })
}

fn token_member(node: &ShapeNode) -> Option<String> {
    node.member("next_token").map(|member| member.model_name.clone())
}

fn list_binding(graph: &ShapeGraph, bound: &OperationBinding) -> Option<ListBinding> {
    let output = graph.shape(bound.output?);
    let output_token = token_member(output);
    let (items_field, item_shape) = output.members().iter().find_map(|member| {
        if Some(&member.model_name) == output_token.as_ref() {
            return None;
        }
        match graph.shape(member.shape).kind {
            ShapeKind::List { element } => Some((member.model_name.clone(), element)),
            _ => None,
        }
    })?;

    Some(ListBinding {
        operation: bound.operation.clone(),
        items_field,
        item_shape,
        input_token: bound.input.and_then(|id| token_member(graph.shape(id))),
        output_token,
    })
}

/// Required get (or list) inputs that also appear in the create output or
/// the list item shape.
fn identifier_fields(
    graph: &ShapeGraph,
    operations: &BTreeMap<Verb, OperationBinding>,
    list: Option<&ListBinding>,
) -> Result<Vec<IdentifierField>, String> {
    let source = operations
        .get(&Verb::Get)
        .or_else(|| operations.get(&Verb::List))
        .ok_or_else(|| "no get or list operation to address instances".to_string())?;

    let required: Vec<&shapebind_model::Member> = source
        .input
        .map(|id| graph.shape(id).members().iter().filter(|m| m.required).collect())
        .unwrap_or_default();
    if required.is_empty() {
        return Err(format!("{} has no required input to use as identifier", source.operation));
    }

    let mut known: BTreeSet<&str> = BTreeSet::new();
    let mut candidate_shapes: Vec<ShapeId> = Vec::new();
    if let Some(output) = operations.get(&Verb::Create).and_then(|bound| bound.output) {
        candidate_shapes.push(output);
    }
    if let Some(list) = list {
        candidate_shapes.push(list.item_shape);
    }
    for id in candidate_shapes {
        known.extend(graph.shape(id).members().iter().map(|m| m.model_name.as_str()));
    }

    let identifiers: Vec<IdentifierField> = required
        .iter()
        .filter(|member| known.contains(member.model_name.as_str()))
        .map(|member| IdentifierField {
            wire_name: member.wire_name.clone(),
            model_name: member.model_name.clone(),
        })
        .collect();

    if identifiers.is_empty() {
        return Err(format!(
            "required inputs of {} ({}) appear in neither the create output nor the list items",
            source.operation,
            required
                .iter()
                .map(|m| m.wire_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    Ok(identifiers)
}

fn status_field(graph: &ShapeGraph, noun: &str, output: &ShapeNode) -> Option<StatusField> {
    let named = format!("{}_status", to_model_name(noun));
    let member = output.member(&named).or_else(|| output.member("status"))?;
    let values = match &graph.shape(member.shape).kind {
        ShapeKind::Enum { values, .. } => values.clone(),
        _ => return None,
    };

    let failure_values: BTreeSet<String> = values
        .iter()
        .filter(|value| value.to_lowercase().contains(FAILURE_KEYWORD))
        .cloned()
        .collect();
    let success_values: BTreeSet<String> = values
        .iter()
        .filter(|value| {
            let lowered = value.to_lowercase();
            !lowered.contains(FAILURE_KEYWORD)
                && SUCCESS_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
        })
        .cloned()
        .collect();

    if success_values.is_empty() {
        log::debug!("Status field {} of {} has no terminal success value", member.model_name, noun);
        return None;
    }

    Some(StatusField {
        model_name: member.model_name.clone(),
        shape: member.shape,
        values,
        success_values,
        failure_values,
    })
}
