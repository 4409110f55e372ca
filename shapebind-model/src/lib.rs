//! Typed model layer for declarative service API descriptions.
//!
//! A [`ServiceDescription`] is resolved into an immutable [`ShapeGraph`]; the
//! [`Codec`] converts between object-model values ([`ModelValue`], [`Record`])
//! and wire values ([`WireValue`]) by walking that graph, and the naming
//! functions translate between wire and model field names.

pub mod codec;
pub mod description;
pub mod errors;
pub mod naming;
pub mod providers;
pub mod shape_graph;
pub mod value;

pub use codec::{Codec, CodecOptions};
pub use description::{OperationSpec, ServiceDescription, ServiceMetadata, ShapeRef, ShapeSpec};
pub use errors::{ModelError, Result};
pub use naming::{to_model_name, to_wire_name, NameMapper};
pub use providers::JsonProvider;
pub use shape_graph::{
    GraphOptions, Member, Operation, ScalarType, ShapeGraph, ShapeId, ShapeKind, ShapeNode,
};
pub use value::{EnumValue, ModelValue, Record, WireValue};
