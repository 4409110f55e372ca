//! Shape graph
//!
//! Resolves the flat shape table of a [`ServiceDescription`] into an immutable
//! arena of [`ShapeNode`]s addressed by [`ShapeId`]. Only shapes reachable from
//! an operation input, output or error are kept. Leaf shapes are placed first,
//! then composites in depth-first post-order, so every member reference points
//! at an already placed node except along recursive edges.
//!
//! Recursion through lists, maps and optional members is allowed. A cycle made
//! only of required structure members can never be satisfied by a finite value
//! and is rejected.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::description::{ServiceDescription, ServiceMetadata, ShapeSpec};
use crate::errors::{ModelError, Result};
use crate::naming::NameMapper;

/// Index of a node in its [`ShapeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

impl ShapeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Scalar primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
        }
    }
}

/// Structure member with its precomputed names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub wire_name: String,
    pub model_name: String,
    pub shape: ShapeId,
    pub required: bool,
}

/// Kind of a resolved shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    Structure { members: Vec<Member> },
    List { element: ShapeId },
    Map { key: ShapeId, value: ShapeId },
    Scalar(ScalarType),
    Enum { values: Vec<String>, closed: bool },
    Blob,
    Timestamp,
}

/// One resolved shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeNode {
    pub name: String,
    pub kind: ShapeKind,
    /// Declared as an error shape
    pub is_error: bool,
}

impl ShapeNode {
    /// Structure members; empty for every other kind.
    pub fn members(&self) -> &[Member] {
        match &self.kind {
            ShapeKind::Structure { members } => members,
            _ => &[],
        }
    }

    /// Member lookup by model name.
    pub fn member(&self, model_name: &str) -> Option<&Member> {
        self.members().iter().find(|m| m.model_name == model_name)
    }

    /// Member lookup by wire name.
    pub fn member_by_wire(&self, wire_name: &str) -> Option<&Member> {
        self.members().iter().find(|m| m.wire_name == wire_name)
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.kind, ShapeKind::Structure { .. })
    }

    /// Values of an enum shape; empty for every other kind.
    pub fn enum_values(&self) -> &[String] {
        match &self.kind {
            ShapeKind::Enum { values, .. } => values,
            _ => &[],
        }
    }

    /// Kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ShapeKind::Structure { .. } => "structure",
            ShapeKind::List { .. } => "list",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Scalar(scalar) => scalar.name(),
            ShapeKind::Enum { .. } => "enum",
            ShapeKind::Blob => "blob",
            ShapeKind::Timestamp => "timestamp",
        }
    }
}

/// Resolved operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub input: Option<ShapeId>,
    pub output: Option<ShapeId>,
    pub errors: Vec<ShapeId>,
}

/// Options for building a graph
#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    /// Enum shapes that accept values outside their listed set when encoding
    pub open_enums: HashSet<String>,
    /// Treat every enum as open
    pub all_enums_open: bool,
}

/// Immutable, resolved shape graph of one description version
#[derive(Debug, Clone)]
pub struct ShapeGraph {
    metadata: ServiceMetadata,
    nodes: Vec<ShapeNode>,
    index: HashMap<String, ShapeId>,
    operations: IndexMap<String, Operation>,
    names: NameMapper,
}

impl ShapeGraph {
    /// Build a graph with default options.
    pub fn build(description: &ServiceDescription) -> Result<Self> {
        Self::build_with(description, &GraphOptions::default())
    }

    /// Build a graph.
    pub fn build_with(description: &ServiceDescription, options: &GraphOptions) -> Result<Self> {
        let start_time = std::time::Instant::now();

        let roots = operation_roots(description)?;
        let reachable = collect_reachable(description, &roots)?;
        let order = resolution_order(description, &reachable)?;

        let index: HashMap<String, ShapeId> = order
            .iter()
            .enumerate()
            .map(|(position, name)| ((*name).to_string(), ShapeId(position)))
            .collect();

        let mut nodes = Vec::with_capacity(order.len());
        for name in &order {
            let spec = &description.shapes[*name];
            nodes.push(ShapeNode {
                name: (*name).to_string(),
                kind: resolve_kind(name, spec, &index, options)?,
                is_error: spec.exception,
            });
        }

        check_required_cycles(&nodes)?;

        let mut operations = IndexMap::new();
        for (name, spec) in &description.operations {
            let lookup = |shape: &str| index.get(shape).copied();
            operations.insert(
                name.clone(),
                Operation {
                    name: spec.name.clone(),
                    input: spec.input.as_ref().and_then(|r| lookup(&r.shape)),
                    output: spec.output.as_ref().and_then(|r| lookup(&r.shape)),
                    errors: spec.errors.iter().filter_map(|r| lookup(&r.shape)).collect(),
                },
            );
        }

        let pruned = description.shapes.len() - nodes.len();
        if pruned > 0 {
            log::debug!("Pruned {} shapes not reachable from any operation", pruned);
        }

        let names = NameMapper::with_vocabulary(
            nodes
                .iter()
                .flat_map(|node| node.members().iter().map(|m| m.wire_name.as_str())),
        );

        log::debug!(
            "Built shape graph for {} {}: {} shapes, {} operations in {:?}",
            description.metadata.service_id,
            description.metadata.api_version,
            nodes.len(),
            operations.len(),
            start_time.elapsed()
        );

        Ok(Self {
            metadata: description.metadata.clone(),
            nodes,
            index,
            operations,
            names,
        })
    }

    pub fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    /// Node for an id handed out by this graph.
    pub fn shape(&self, id: ShapeId) -> &ShapeNode {
        &self.nodes[id.0]
    }

    pub fn shape_id(&self, name: &str) -> Option<ShapeId> {
        self.index.get(name).copied()
    }

    pub fn shape_named(&self, name: &str) -> Option<&ShapeNode> {
        self.shape_id(name).map(|id| self.shape(id))
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Operations in description order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.keys().map(String::as_str).collect()
    }

    /// Nodes with their ids, in resolution order.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &ShapeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (ShapeId(position), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Name mapper seeded with every member wire name of the graph.
    pub fn names(&self) -> &NameMapper {
        &self.names
    }

    /// Whether a blob is reachable from `id` through any nesting.
    pub fn contains_blob(&self, id: ShapeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            match &self.shape(current).kind {
                ShapeKind::Blob => return true,
                ShapeKind::Structure { members } => stack.extend(members.iter().map(|m| m.shape)),
                ShapeKind::List { element } => stack.push(*element),
                ShapeKind::Map { key, value } => {
                    stack.push(*key);
                    stack.push(*value);
                }
                _ => {}
            }
        }
        false
    }
}

fn is_composite(spec: &ShapeSpec) -> bool {
    matches!(spec.shape_type.as_str(), "structure" | "list" | "map")
}

fn operation_roots(description: &ServiceDescription) -> Result<Vec<&str>> {
    let mut roots = Vec::new();
    for (name, operation) in &description.operations {
        let refs = operation
            .input
            .iter()
            .chain(operation.output.iter())
            .chain(operation.errors.iter());
        for shape_ref in refs {
            if !description.shapes.contains_key(&shape_ref.shape) {
                return Err(ModelError::malformed(format!(
                    "operation {} references undefined shape {}",
                    name, shape_ref.shape
                )));
            }
            roots.push(shape_ref.shape.as_str());
        }
    }
    Ok(roots)
}

/// Shapes referenced by `spec`, validating the fields its type requires.
fn child_refs<'a>(name: &str, spec: &'a ShapeSpec) -> Result<Vec<&'a str>> {
    match spec.shape_type.as_str() {
        "structure" => Ok(spec.members.values().map(|r| r.shape.as_str()).collect()),
        "list" => spec
            .member
            .as_ref()
            .map(|element| vec![element.shape.as_str()])
            .ok_or_else(|| ModelError::malformed(format!("list shape {} has no member", name))),
        "map" => match (&spec.key, &spec.value) {
            (Some(key), Some(value)) => Ok(vec![key.shape.as_str(), value.shape.as_str()]),
            _ => Err(ModelError::malformed(format!(
                "map shape {} needs both key and value",
                name
            ))),
        },
        _ => Ok(Vec::new()),
    }
}

fn collect_reachable<'a>(
    description: &'a ServiceDescription,
    roots: &[&'a str],
) -> Result<HashSet<&'a str>> {
    let mut reachable = HashSet::new();
    let mut stack: Vec<&str> = roots.to_vec();
    while let Some(name) = stack.pop() {
        if !reachable.insert(name) {
            continue;
        }
        let spec = &description.shapes[name];
        for child in child_refs(name, spec)? {
            if !description.shapes.contains_key(child) {
                return Err(ModelError::malformed(format!(
                    "shape {} references undefined shape {}",
                    name, child
                )));
            }
            stack.push(child);
        }
    }
    Ok(reachable)
}

/// Leaves first (description order), then composites in DFS post-order.
fn resolution_order<'a>(
    description: &'a ServiceDescription,
    reachable: &HashSet<&'a str>,
) -> Result<Vec<&'a str>> {
    let mut order: Vec<&str> = description
        .shapes
        .iter()
        .filter(|(name, spec)| reachable.contains(name.as_str()) && !is_composite(spec))
        .map(|(name, _)| name.as_str())
        .collect();

    let mut placed: HashSet<&str> = order.iter().copied().collect();
    let mut in_progress = HashSet::new();

    fn visit<'a>(
        name: &'a str,
        description: &'a ServiceDescription,
        placed: &mut HashSet<&'a str>,
        in_progress: &mut HashSet<&'a str>,
        order: &mut Vec<&'a str>,
    ) -> Result<()> {
        if placed.contains(name) || !in_progress.insert(name) {
            return Ok(());
        }
        let spec = &description.shapes[name];
        for child in child_refs(name, spec)? {
            visit(child, description, placed, in_progress, order)?;
        }
        in_progress.remove(name);
        placed.insert(name);
        order.push(name);
        Ok(())
    }

    for (name, spec) in &description.shapes {
        if reachable.contains(name.as_str()) && is_composite(spec) {
            visit(name, description, &mut placed, &mut in_progress, &mut order)?;
        }
    }
    Ok(order)
}

fn resolve_kind(
    name: &str,
    spec: &ShapeSpec,
    index: &HashMap<String, ShapeId>,
    options: &GraphOptions,
) -> Result<ShapeKind> {
    let id_of = |shape: &str| {
        index.get(shape).copied().ok_or_else(|| {
            ModelError::malformed(format!("shape {} references undefined shape {}", name, shape))
        })
    };

    let kind = match spec.shape_type.as_str() {
        "structure" => {
            for required in &spec.required {
                if !spec.members.contains_key(required) {
                    return Err(ModelError::malformed(format!(
                        "shape {} requires unknown member {}",
                        name, required
                    )));
                }
            }
            let mut seen: HashMap<String, &str> = HashMap::new();
            let mut members = Vec::with_capacity(spec.members.len());
            for (wire_name, shape_ref) in &spec.members {
                let model_name = crate::naming::to_model_name(wire_name);
                if let Some(previous) = seen.insert(model_name.clone(), wire_name) {
                    return Err(ModelError::malformed(format!(
                        "members {} and {} of shape {} share the field name {}",
                        previous, wire_name, name, model_name
                    )));
                }
                members.push(Member {
                    wire_name: wire_name.clone(),
                    model_name,
                    shape: id_of(&shape_ref.shape)?,
                    required: spec.required.contains(wire_name),
                });
            }
            ShapeKind::Structure { members }
        }
        "list" => {
            let element = child_refs(name, spec)?[0];
            ShapeKind::List {
                element: id_of(element)?,
            }
        }
        "map" => {
            let refs = child_refs(name, spec)?;
            ShapeKind::Map {
                key: id_of(refs[0])?,
                value: id_of(refs[1])?,
            }
        }
        "string" => match &spec.enum_values {
            Some(values) => ShapeKind::Enum {
                values: values.clone(),
                closed: !(options.all_enums_open || options.open_enums.contains(name)),
            },
            None => ShapeKind::Scalar(ScalarType::String),
        },
        "integer" => ShapeKind::Scalar(ScalarType::Integer),
        "long" => ShapeKind::Scalar(ScalarType::Long),
        "float" => ShapeKind::Scalar(ScalarType::Float),
        "double" => ShapeKind::Scalar(ScalarType::Double),
        "boolean" => ShapeKind::Scalar(ScalarType::Boolean),
        "blob" => ShapeKind::Blob,
        "timestamp" => ShapeKind::Timestamp,
        other => {
            return Err(ModelError::malformed(format!(
                "shape {} has unsupported type '{}'",
                name, other
            )))
        }
    };
    Ok(kind)
}

/// Reject cycles whose every edge is a required structure-to-structure member.
fn check_required_cycles(nodes: &[ShapeNode]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(
        id: ShapeId,
        nodes: &[ShapeNode],
        marks: &mut [Mark],
        path: &mut Vec<ShapeId>,
    ) -> Result<()> {
        marks[id.0] = Mark::Active;
        path.push(id);
        for member in nodes[id.0].members() {
            if !member.required || !nodes[member.shape.0].is_structure() {
                continue;
            }
            match marks[member.shape.0] {
                Mark::Active => {
                    let start = path.iter().position(|p| *p == member.shape).unwrap_or(0);
                    let cycle: Vec<&str> = path[start..]
                        .iter()
                        .chain(std::iter::once(&member.shape))
                        .map(|p| nodes[p.0].name.as_str())
                        .collect();
                    return Err(ModelError::malformed(format!(
                        "required members form an unresolvable cycle: {}",
                        cycle.join(" -> ")
                    )));
                }
                Mark::New => visit(member.shape, nodes, marks, path)?,
                Mark::Done => {}
            }
        }
        path.pop();
        marks[id.0] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::New; nodes.len()];
    let mut path = Vec::new();
    for position in 0..nodes.len() {
        if marks[position] == Mark::New {
            visit(ShapeId(position), nodes, &mut marks, &mut path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn description(value: serde_json::Value) -> ServiceDescription {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> ServiceDescription {
        description(json!({
            "metadata": {"apiVersion": "2024-01-01", "serviceId": "ModelHub"},
            "operations": {
                "CreateModel": {
                    "name": "CreateModel",
                    "input": {"shape": "CreateModelInput"},
                    "output": {"shape": "CreateModelOutput"},
                    "errors": [{"shape": "ResourceLimitExceeded"}]
                }
            },
            "shapes": {
                "CreateModelInput": {
                    "type": "structure",
                    "required": ["ModelName"],
                    "members": {
                        "ModelName": {"shape": "EntityName"},
                        "VolumeSizeInGB": {"shape": "Size"},
                        "Tags": {"shape": "TagList"},
                        "Environment": {"shape": "EnvironmentMap"},
                        "Mode": {"shape": "Mode"}
                    }
                },
                "CreateModelOutput": {
                    "type": "structure",
                    "members": {"ModelArn": {"shape": "Arn"}, "Artifact": {"shape": "Artifact"}}
                },
                "Artifact": {"type": "structure", "members": {"Payload": {"shape": "Payload"}}},
                "Payload": {"type": "blob"},
                "TagList": {"type": "list", "member": {"shape": "Tag"}},
                "Tag": {
                    "type": "structure",
                    "required": ["Key"],
                    "members": {"Key": {"shape": "EntityName"}, "Value": {"shape": "EntityName"}}
                },
                "EnvironmentMap": {
                    "type": "map",
                    "key": {"shape": "EntityName"},
                    "value": {"shape": "EntityName"}
                },
                "Mode": {"type": "string", "enum": ["Single", "Multi"]},
                "EntityName": {"type": "string"},
                "Size": {"type": "integer"},
                "Arn": {"type": "string"},
                "ResourceLimitExceeded": {
                    "type": "structure",
                    "members": {"Message": {"shape": "EntityName"}},
                    "exception": true
                },
                "Orphan": {"type": "structure", "members": {"Name": {"shape": "EntityName"}}}
            }
        }))
    }

    #[test]
    fn test_resolves_reachable_shapes_and_prunes_orphans() {
        let graph = ShapeGraph::build(&sample()).unwrap();

        assert!(graph.shape_named("Orphan").is_none(), "unreferenced shape should be pruned");
        assert!(graph.shape_named("Payload").is_some());
        assert_eq!(graph.len(), 12);
        assert_eq!(graph.metadata().service_id, "ModelHub");

        let operation = graph.operation("CreateModel").unwrap();
        assert_eq!(graph.shape(operation.input.unwrap()).name, "CreateModelInput");
        assert!(graph.shape(operation.errors[0]).is_error);
    }

    #[test]
    fn test_members_keep_order_and_model_names() {
        let graph = ShapeGraph::build(&sample()).unwrap();
        let input = graph.shape_named("CreateModelInput").unwrap();

        let names: Vec<(&str, &str, bool)> = input
            .members()
            .iter()
            .map(|m| (m.wire_name.as_str(), m.model_name.as_str(), m.required))
            .collect();
        assert_eq!(
            names,
            vec![
                ("ModelName", "model_name", true),
                ("VolumeSizeInGB", "volume_size_in_gb", false),
                ("Tags", "tags", false),
                ("Environment", "environment", false),
                ("Mode", "mode", false),
            ]
        );
        assert_eq!(graph.names().to_wire_name("volume_size_in_gb"), "VolumeSizeInGB");
    }

    #[test]
    fn test_leaves_resolved_before_composites() {
        let graph = ShapeGraph::build(&sample()).unwrap();
        let last_leaf = graph
            .shapes()
            .filter(|(_, node)| {
                !matches!(
                    node.kind,
                    ShapeKind::Structure { .. } | ShapeKind::List { .. } | ShapeKind::Map { .. }
                )
            })
            .map(|(id, _)| id)
            .max()
            .unwrap();
        let first_composite = graph
            .shapes()
            .filter(|(_, node)| {
                matches!(
                    node.kind,
                    ShapeKind::Structure { .. } | ShapeKind::List { .. } | ShapeKind::Map { .. }
                )
            })
            .map(|(id, _)| id)
            .min()
            .unwrap();
        assert!(last_leaf < first_composite);

        // Post-order: Tag is placed before the list that contains it.
        let tag = graph.shape_id("Tag").unwrap();
        let tag_list = graph.shape_id("TagList").unwrap();
        assert!(tag < tag_list);
    }

    #[test]
    fn test_enums_closed_unless_opened() {
        let graph = ShapeGraph::build(&sample()).unwrap();
        assert!(matches!(
            graph.shape_named("Mode").unwrap().kind,
            ShapeKind::Enum { closed: true, .. }
        ));

        let options = GraphOptions {
            open_enums: HashSet::from(["Mode".to_string()]),
            ..GraphOptions::default()
        };
        let graph = ShapeGraph::build_with(&sample(), &options).unwrap();
        assert!(matches!(
            graph.shape_named("Mode").unwrap().kind,
            ShapeKind::Enum { closed: false, .. }
        ));
    }

    #[test]
    fn test_contains_blob() {
        let graph = ShapeGraph::build(&sample()).unwrap();
        assert!(graph.contains_blob(graph.shape_id("CreateModelOutput").unwrap()));
        assert!(!graph.contains_blob(graph.shape_id("CreateModelInput").unwrap()));
    }

    #[test]
    fn test_undefined_member_reference_is_malformed() {
        let mut broken = sample();
        broken.shapes["Tag"]
            .members
            .insert("Owner".to_string(), crate::description::ShapeRef { shape: "Missing".to_string() });

        let error = ShapeGraph::build(&broken).unwrap_err();
        assert!(matches!(error, ModelError::MalformedDescription { .. }));
        assert!(error.to_string().contains("Missing"));
    }

    #[test]
    fn test_undefined_operation_reference_is_malformed() {
        let broken = description(json!({
            "operations": {"Ping": {"name": "Ping", "input": {"shape": "PingInput"}}},
            "shapes": {}
        }));
        let error = ShapeGraph::build(&broken).unwrap_err();
        assert!(error.to_string().contains("operation Ping"));
    }

    #[test]
    fn test_unknown_required_member_is_malformed() {
        let broken = description(json!({
            "operations": {"Ping": {"name": "Ping", "input": {"shape": "PingInput"}}},
            "shapes": {"PingInput": {"type": "structure", "required": ["Nope"], "members": {}}}
        }));
        assert!(ShapeGraph::build(&broken).is_err());
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let broken = description(json!({
            "operations": {"Ping": {"name": "Ping", "input": {"shape": "PingInput"}}},
            "shapes": {"PingInput": {"type": "union", "members": {}}}
        }));
        let error = ShapeGraph::build(&broken).unwrap_err();
        assert!(error.to_string().contains("union"));
    }

    #[test]
    fn test_colliding_model_names_are_malformed() {
        let broken = description(json!({
            "operations": {"Ping": {"name": "Ping", "input": {"shape": "PingInput"}}},
            "shapes": {
                "PingInput": {
                    "type": "structure",
                    "members": {"SizeInGB": {"shape": "Size"}, "SizeInGb": {"shape": "Size"}}
                },
                "Size": {"type": "integer"}
            }
        }));
        let error = ShapeGraph::build(&broken).unwrap_err();
        assert!(error.to_string().contains("size_in_gb"));
    }

    #[test]
    fn test_required_structure_cycle_is_malformed() {
        let broken = description(json!({
            "operations": {"Ping": {"name": "Ping", "input": {"shape": "Outer"}}},
            "shapes": {
                "Outer": {"type": "structure", "required": ["Inner"], "members": {"Inner": {"shape": "Inner"}}},
                "Inner": {"type": "structure", "required": ["Outer"], "members": {"Outer": {"shape": "Outer"}}}
            }
        }));
        let error = ShapeGraph::build(&broken).unwrap_err();
        assert!(error.to_string().contains("cycle"), "{error}");
    }

    #[test]
    fn test_recursion_through_list_and_optional_member_is_allowed() {
        let recursive = description(json!({
            "operations": {"Search": {"name": "Search", "input": {"shape": "SearchExpression"}}},
            "shapes": {
                "SearchExpression": {
                    "type": "structure",
                    "members": {
                        "SubExpressions": {"shape": "SearchExpressionList"},
                        "Parent": {"shape": "SearchExpression"}
                    }
                },
                "SearchExpressionList": {"type": "list", "member": {"shape": "SearchExpression"}}
            }
        }));

        let graph = ShapeGraph::build(&recursive).unwrap();
        let expression = graph.shape_id("SearchExpression").unwrap();
        let list = graph.shape_named("SearchExpressionList").unwrap();
        assert_eq!(list.kind, ShapeKind::List { element: expression });
        assert_eq!(graph.shape(expression).member("parent").unwrap().shape, expression);
    }
}
