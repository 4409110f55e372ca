//! Resources, defaults and lifecycle waits over a shape graph.
//!
//! A [`ServiceBinding`] pairs a [`ShapeGraph`](shapebind_model::ShapeGraph)
//! with an [`Invoker`]. Operations can be called directly; resources derived
//! from operation naming get create/get/list on their [`ResourceType`] and
//! refresh/update/delete/wait on each [`Resource`]. Inputs are completed from
//! a [`DefaultsDocument`] before they are encoded.

pub mod binding;
pub mod defaults;
pub mod embedded_data;
pub mod errors;
pub mod invoker;
pub mod lifecycle;
pub mod resources;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use binding::{
    Identifiable, Listing, RecordPages, Resource, ResourceType, Serializable, ServiceBinding,
    Waitable,
};
pub use defaults::{DefaultsDocument, DefaultsError, DefaultsResolver, DEFAULTS_PATH_ENV};
pub use embedded_data::{load_graph, EmbeddedModels};
pub use errors::{Result, RuntimeError, ServiceError};
pub use invoker::{ApiError, ErrorClass, ErrorClassifier, Invoker};
pub use lifecycle::{
    CancellationToken, Clock, Observation, Page, Paginator, SystemClock, WaitGoal, WaitOptions,
    WaitSession, WaitState,
};
pub use resources::{
    derive_resources, IdentifierField, ListBinding, OperationBinding, ResourceCatalog,
    ResourceDefinition, StatusField, UnsupportedResource, Verb,
};
