//! Service binding: operations and resources of one service description.
//!
//! [`ServiceBinding`] is the entry point. It owns the shape graph, the derived
//! [`ResourceCatalog`] and the [`Invoker`], and hands out [`ResourceType`]s
//! (create, get, list) and [`Resource`] handles (refresh, update, delete,
//! custom verbs and waits). Capabilities are exposed through the
//! [`Serializable`], [`Identifiable`] and [`Waitable`] traits.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use shapebind_model::{Codec, ModelError, ModelValue, Operation, Record, ShapeGraph, ShapeId, WireValue};

use crate::defaults::{self, DefaultsDocument, DefaultsResolver};
use crate::embedded_data;
use crate::errors::{Result, RuntimeError, ServiceError};
use crate::invoker::{ApiError, ErrorClassifier, Invoker};
use crate::lifecycle::{Clock, Observation, Page, Paginator, SystemClock, WaitGoal, WaitOptions, WaitSession};
use crate::resources::{OperationBinding, ResourceCatalog, ResourceDefinition, Verb};

/// Where a binding takes its defaults from.
#[derive(Clone)]
enum DefaultsSource {
    /// The process-wide document, loaded on first use
    Global,
    Document(Arc<DefaultsDocument>),
}

/// Operations and resources of one service, bound to an invoker.
#[derive(Clone)]
pub struct ServiceBinding {
    graph: Arc<ShapeGraph>,
    catalog: Arc<ResourceCatalog>,
    invoker: Arc<dyn Invoker>,
    defaults: DefaultsSource,
    clock: Arc<dyn Clock>,
    classifier: ErrorClassifier,
}

impl fmt::Debug for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinding")
            .field("service", &self.graph.metadata().service_id)
            .field("api_version", &self.graph.metadata().api_version)
            .field("resources", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl ServiceBinding {
    pub fn new(graph: impl Into<Arc<ShapeGraph>>, invoker: Arc<dyn Invoker>) -> Self {
        let graph = graph.into();
        let catalog = Arc::new(ResourceCatalog::derive(&graph));
        Self {
            graph,
            catalog,
            invoker,
            defaults: DefaultsSource::Global,
            clock: Arc::new(SystemClock),
            classifier: ErrorClassifier::default(),
        }
    }

    /// Bind one of the embedded service descriptions.
    pub fn from_embedded(service: &str, api_version: &str, invoker: Arc<dyn Invoker>) -> Result<Self> {
        Ok(Self::new(embedded_data::load_graph(service, api_version)?, invoker))
    }

    /// Use `document` instead of the process-wide defaults.
    #[must_use]
    pub fn with_defaults(mut self, document: impl Into<Arc<DefaultsDocument>>) -> Self {
        self.defaults = DefaultsSource::Document(document.into());
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn graph(&self) -> &ShapeGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn codec(&self) -> Codec<'_> {
        Codec::new(&self.graph)
    }

    /// Defaults in effect, if any could be loaded.
    pub fn defaults(&self) -> Option<Arc<DefaultsDocument>> {
        match &self.defaults {
            DefaultsSource::Document(document) => Some(Arc::clone(document)),
            DefaultsSource::Global => match defaults::global() {
                Ok(document) => Some(document),
                Err(e) => {
                    log::warn!("Ignoring defaults: {}", e);
                    None
                }
            },
        }
    }

    /// Invoke any operation of the service.
    ///
    /// The input is completed from the defaults, encoded and validated before
    /// the invoker is called. Returns the decoded output, or `None` for
    /// operations without one.
    pub fn call(&self, operation: &str, input: Record) -> Result<Option<Record>> {
        let owner = self
            .catalog
            .resources()
            .find(|resource| resource.operations.values().any(|bound| bound.operation == operation))
            .map(|resource| resource.name.as_str());
        self.execute(owner, operation, input)
    }

    /// Resource type by name, e.g. "TrainingJob".
    pub fn resource(&self, name: &str) -> Result<ResourceType<'_>> {
        let definition = self.catalog.get(name)?;
        Ok(ResourceType {
            binding: self,
            definition,
        })
    }

    fn operation(&self, name: &str) -> Result<&Operation> {
        self.graph
            .operation(name)
            .ok_or_else(|| RuntimeError::UnknownOperation(name.to_string()))
    }

    fn execute(&self, resource: Option<&str>, operation: &str, input: Record) -> Result<Option<Record>> {
        let resolved = self.operation(operation)?;
        let codec = self.codec();

        let request = match resolved.input {
            Some(shape) => {
                let input = match self.defaults() {
                    Some(document) => DefaultsResolver::new(&document, &self.graph).resolve(resource, shape, input)?,
                    None => input,
                };
                codec.encode_record(&input, shape)?
            }
            None => WireValue::object(),
        };

        log::debug!("Invoking {}", operation);
        self.trace_payload(operation, "request", resolved.input, &request);
        let response = self
            .invoker
            .invoke(operation, &request)
            .map_err(|error| self.service_error(resolved, error))?;
        self.trace_payload(operation, "response", resolved.output, &response);

        resolved
            .output
            .map(|shape| codec.decode_record(&response, shape))
            .transpose()
            .map_err(RuntimeError::from)
    }

    /// Payloads of shapes that can carry blobs are not logged.
    fn trace_payload(&self, operation: &str, direction: &str, shape: Option<ShapeId>, payload: &WireValue) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        match shape {
            Some(id) if self.graph.contains_blob(id) => {
                log::trace!("{} {} omitted: shape {} carries binary data", operation, direction, self.graph.shape(id).name);
            }
            _ => log::trace!("{} {}: {}", operation, direction, payload.to_json()),
        }
    }

    fn service_error(&self, operation: &Operation, error: ApiError) -> RuntimeError {
        let details = operation
            .errors
            .iter()
            .copied()
            .find(|id| self.graph.shape(*id).name == error.code)
            .and_then(|id| match self.codec().decode_record(&error.fields, id) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::debug!("Could not decode {} error fields: {}", error.code, e);
                    None
                }
            });
        log::debug!("{} failed: {}", operation.name, error);
        RuntimeError::Api(ServiceError {
            operation: operation.name.clone(),
            code: error.code,
            message: error.message,
            details,
        })
    }
}

/// Request for `bound`: identifier fields the input shape accepts, then `extra`.
fn request_for(graph: &ShapeGraph, bound: &OperationBinding, identifiers: &Record, extra: Record) -> Record {
    let Some(input) = bound.input.map(|id| graph.shape(id)) else {
        return extra;
    };
    let mut request = extra;
    for (field, value) in identifiers.fields() {
        if input.member(field).is_some() && !request.contains(field) {
            request.set(field.clone(), value.clone());
        }
    }
    request
}

type FetchPage<'a> = Box<dyn FnMut(Option<&str>) -> Result<Page<Record>> + 'a>;

/// Iterator over listed summaries, see [`Listing::iter`].
pub type RecordPages<'a> = Paginator<Record, FetchPage<'a>>;

/// Resource kind of a service, e.g. all training jobs.
#[derive(Debug, Clone, Copy)]
pub struct ResourceType<'b> {
    binding: &'b ServiceBinding,
    definition: &'b ResourceDefinition,
}

impl<'b> ResourceType<'b> {
    pub fn name(&self) -> &'b str {
        &self.definition.name
    }

    pub fn definition(&self) -> &'b ResourceDefinition {
        self.definition
    }

    fn bound(&self, verb: &Verb) -> Result<&'b OperationBinding> {
        self.definition
            .operation(verb)
            .ok_or_else(|| RuntimeError::not_supported(&self.definition.name, verb))
    }

    /// Create an instance and return a handle to it.
    ///
    /// Identifiers are read from the create output, falling back to the
    /// input. When the resource has a get operation the handle is refreshed
    /// before it is returned.
    pub fn create(&self, input: Record) -> Result<Resource<'b>> {
        let bound = self.bound(&Verb::Create)?;
        let output = self
            .binding
            .execute(Some(self.name()), &bound.operation, input.clone())?
            .unwrap_or_default();

        let mut identifiers = Record::new();
        for field in &self.definition.identifiers {
            let value = output
                .get(&field.model_name)
                .or_else(|| input.get(&field.model_name))
                .filter(|value| !value.is_null());
            if let Some(value) = value {
                identifiers.set(field.model_name.clone(), value.clone());
            }
        }
        log::info!("Created {} {}", self.name(), display_identifiers(&identifiers));

        let mut resource = Resource {
            binding: self.binding,
            definition: self.definition,
            identifiers,
            state: output,
        };
        if self.definition.supports(&Verb::Get) {
            resource.refresh()?;
        }
        Ok(resource)
    }

    /// Fetch an existing instance by its identifier fields.
    pub fn get(&self, identifiers: Record) -> Result<Resource<'b>> {
        let mut resource = Resource {
            binding: self.binding,
            definition: self.definition,
            identifiers: self.pick_identifiers(&identifiers),
            state: Record::new(),
        };
        let bound = self.bound(&Verb::Get)?;
        resource.state = self
            .binding
            .execute(Some(self.name()), &bound.operation, identifiers)?
            .unwrap_or_default();
        Ok(resource)
    }

    /// Lazy listing of instance summaries; no request is sent until iterated.
    pub fn list(&self, input: Record) -> Result<Listing<'b>> {
        if self.definition.list.is_none() {
            return Err(RuntimeError::not_supported(&self.definition.name, Verb::List));
        }
        Ok(Listing {
            resource_type: *self,
            input,
        })
    }

    fn pick_identifiers(&self, source: &Record) -> Record {
        let mut identifiers = Record::new();
        for field in &self.definition.identifiers {
            if let Some(value) = source.get(&field.model_name) {
                identifiers.set(field.model_name.clone(), value.clone());
            }
        }
        identifiers
    }
}

/// Restartable, lazy sequence of listed summaries.
#[derive(Debug, Clone)]
pub struct Listing<'b> {
    resource_type: ResourceType<'b>,
    input: Record,
}

impl<'b> Listing<'b> {
    /// Iterate from the first page.
    pub fn iter(&self) -> RecordPages<'b> {
        let binding = self.resource_type.binding;
        let resource = self.resource_type.name();
        let input = self.input.clone();
        let layout = self.resource_type.definition.list.clone();
        let operation = layout
            .as_ref()
            .map(|list| list.operation.clone())
            .unwrap_or_default();

        let fetch: FetchPage<'b> = Box::new(move |token: Option<&str>| -> Result<Page<Record>> {
            let Some(list) = layout.as_ref() else {
                return Ok(Page::last(Vec::new()));
            };
            let mut request = input.clone();
            if let (Some(token), Some(field)) = (token, list.input_token.as_ref()) {
                request.set(field.clone(), token);
            }
            let Some(mut output) = binding.execute(Some(resource), &list.operation, request)? else {
                return Ok(Page::last(Vec::new()));
            };

            let next_token = list
                .output_token
                .as_ref()
                .and_then(|field| output.get_str(field))
                .map(str::to_string);
            let items = match output.remove(&list.items_field) {
                Some(ModelValue::List(items)) => items
                    .into_iter()
                    .map(|item| match item {
                        ModelValue::Record(record) => Ok(record),
                        other => Err(RuntimeError::from(ModelError::type_mismatch(
                            "record",
                            other.kind_name(),
                            format!("{}.{}", list.operation, list.items_field),
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Ok(Page::new(items, next_token))
        });
        Paginator::new(operation, fetch)
    }

    /// Every summary, fetching all pages.
    pub fn collect_all(&self) -> Result<Vec<Record>> {
        self.iter().collect()
    }
}

impl<'b> IntoIterator for &Listing<'b> {
    type Item = Result<Record>;
    type IntoIter = RecordPages<'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Handle to one resource instance.
#[derive(Debug, Clone)]
pub struct Resource<'b> {
    binding: &'b ServiceBinding,
    definition: &'b ResourceDefinition,
    identifiers: Record,
    state: Record,
}

impl<'b> Resource<'b> {
    pub fn name(&self) -> &'b str {
        &self.definition.name
    }

    /// Last fetched attributes.
    pub fn attributes(&self) -> &Record {
        &self.state
    }

    pub fn get(&self, field: &str) -> Option<&ModelValue> {
        self.state.get(field)
    }

    /// Current value of the status field, if the resource has one.
    pub fn status(&self) -> Option<&str> {
        self.definition
            .status
            .as_ref()
            .and_then(|status| self.state.get_str(&status.model_name))
    }

    fn label(&self) -> String {
        format!("{} {}", self.definition.name, display_identifiers(&self.identifiers))
    }

    fn bound(&self, verb: &Verb) -> Result<&'b OperationBinding> {
        self.definition
            .operation(verb)
            .ok_or_else(|| RuntimeError::not_supported(&self.definition.name, verb))
    }

    fn run(&self, verb: &Verb, extra: Record) -> Result<Option<Record>> {
        let bound = self.bound(verb)?;
        let request = request_for(self.binding.graph(), bound, &self.identifiers, extra);
        self.binding.execute(Some(self.name()), &bound.operation, request)
    }

    /// Re-read the attributes through the get operation.
    pub fn refresh(&mut self) -> Result<&Record> {
        self.state = self.run(&Verb::Get, Record::new())?.unwrap_or_default();
        Ok(&self.state)
    }

    /// Apply `changes` and refresh.
    pub fn update(&mut self, changes: Record) -> Result<()> {
        self.run(&Verb::Update, changes)?;
        log::info!("Updated {}", self.label());
        if self.definition.supports(&Verb::Get) {
            self.refresh()?;
        }
        Ok(())
    }

    pub fn delete(&self) -> Result<()> {
        self.run(&Verb::Delete, Record::new())?;
        log::info!("Deleted {}", self.label());
        Ok(())
    }

    /// Invoke a verb by method name, e.g. "stop".
    pub fn invoke(&mut self, verb: &str, input: Record) -> Result<Option<Record>> {
        let resolved = self
            .definition
            .operations
            .keys()
            .find(|candidate| candidate.method_name() == verb)
            .cloned()
            .ok_or_else(|| {
                let custom: Vec<&str> = self.definition.custom_verbs().collect();
                log::debug!("{} has custom verbs [{}]", self.definition.name, custom.join(", "));
                RuntimeError::not_supported(&self.definition.name, verb)
            })?;
        self.run(&resolved, input)
    }

    /// Wait until the status equals `target`.
    pub fn wait_for_status_with(&mut self, target: &str, options: &WaitOptions) -> Result<()> {
        let status = self
            .definition
            .status
            .as_ref()
            .ok_or_else(|| RuntimeError::not_supported(&self.definition.name, "wait_for_status"))?;
        if !status.is_known(target) {
            let shape = &self.binding.graph().shape(status.shape).name;
            return Err(ModelError::invalid_enum(shape, target, status.values.as_slice(), &status.model_name).into());
        }
        let goal = WaitGoal::status(
            [target.to_string()],
            status
                .values
                .iter()
                .filter(|value| status.is_failure(value) && *value != target)
                .cloned(),
        );
        self.poll(goal, options)
    }

    /// Wait until the status reaches any terminal success value.
    pub fn wait_with(&mut self, options: &WaitOptions) -> Result<()> {
        let status = self
            .definition
            .status
            .as_ref()
            .ok_or_else(|| RuntimeError::not_supported(&self.definition.name, "wait"))?;
        let goal = WaitGoal::status(
            status.values.iter().filter(|value| status.is_success(value)).cloned(),
            status.values.iter().filter(|value| status.is_failure(value)).cloned(),
        );
        self.poll(goal, options)
    }

    /// Wait until get reports the instance gone.
    pub fn wait_for_delete_with(&mut self, options: &WaitOptions) -> Result<()> {
        self.bound(&Verb::Get)?;
        self.poll(WaitGoal::Deletion, options)
    }

    fn wait_options(&self, poll_interval: Duration, timeout: Option<Duration>) -> WaitOptions {
        WaitOptions::new(poll_interval, timeout).with_classifier(self.binding.classifier.clone())
    }

    fn poll(&mut self, goal: WaitGoal, options: &WaitOptions) -> Result<()> {
        let label = self.label();
        let clock = Arc::clone(&self.binding.clock);
        let status_field = self.definition.status.as_ref().map(|status| status.model_name.clone());
        let reason_field = self.definition.failure_reason.clone();

        let outcome = {
            let this = &*self;
            let mut session = WaitSession::new(label, goal, options, clock.as_ref());
            session.run(|| {
                let state = this.run(&Verb::Get, Record::new())?.unwrap_or_default();
                Ok(Observation {
                    status: status_field
                        .as_ref()
                        .and_then(|field| state.get_str(field))
                        .map(str::to_string),
                    failure_reason: reason_field
                        .as_ref()
                        .and_then(|field| state.get_str(field))
                        .map(str::to_string),
                    value: state,
                })
            })?
        };
        if let Some(state) = outcome {
            self.state = state;
        }
        Ok(())
    }

    fn output_shape(&self) -> Option<ShapeId> {
        self.definition
            .operation(&Verb::Get)
            .and_then(|bound| bound.output)
            .or_else(|| self.definition.list.as_ref().map(|list| list.item_shape))
    }
}

fn display_identifiers(identifiers: &Record) -> String {
    identifiers
        .fields()
        .map(|(_, value)| match value.as_str() {
            Some(text) => text.to_string(),
            None => value.kind_name().to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Converts to the wire representation of its shape.
pub trait Serializable {
    fn to_wire(&self) -> Result<WireValue>;

    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(self.to_wire()?.to_json())
    }
}

/// Addressable by identifier fields.
pub trait Identifiable {
    fn resource_name(&self) -> &str;
    fn identifiers(&self) -> &Record;
}

/// Pollable until a lifecycle status is reached.
pub trait Waitable {
    fn wait_for_status(&mut self, target: &str, poll_interval: Duration, timeout: Option<Duration>) -> Result<()>;
    fn wait(&mut self, poll_interval: Duration, timeout: Option<Duration>) -> Result<()>;
    fn wait_for_delete(&mut self, poll_interval: Duration, timeout: Option<Duration>) -> Result<()>;
}

impl Serializable for Resource<'_> {
    fn to_wire(&self) -> Result<WireValue> {
        let shape = self
            .output_shape()
            .ok_or_else(|| RuntimeError::not_supported(&self.definition.name, "serialize"))?;
        Ok(self.binding.codec().encode_record(&self.state, shape)?)
    }
}

impl Identifiable for Resource<'_> {
    fn resource_name(&self) -> &str {
        &self.definition.name
    }

    fn identifiers(&self) -> &Record {
        &self.identifiers
    }
}

impl Waitable for Resource<'_> {
    fn wait_for_status(&mut self, target: &str, poll_interval: Duration, timeout: Option<Duration>) -> Result<()> {
        let options = self.wait_options(poll_interval, timeout);
        self.wait_for_status_with(target, &options)
    }

    fn wait(&mut self, poll_interval: Duration, timeout: Option<Duration>) -> Result<()> {
        let options = self.wait_options(poll_interval, timeout);
        self.wait_with(&options)
    }

    fn wait_for_delete(&mut self, poll_interval: Duration, timeout: Option<Duration>) -> Result<()> {
        let options = self.wait_options(poll_interval, timeout);
        self.wait_for_delete_with(&options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, ScriptedInvoker};
    use serde_json::json;

    fn binding(invoker: Arc<ScriptedInvoker>) -> ServiceBinding {
        ServiceBinding::from_embedded("modelhub", "2024-01-01", invoker)
            .unwrap()
            .with_defaults(DefaultsDocument::default())
            .with_clock(Arc::new(ManualClock::new()))
    }

    #[test]
    fn test_call_encodes_and_decodes() {
        let invoker = Arc::new(
            ScriptedInvoker::new().respond("DescribeModel", json!({"ModelName": "m", "ModelArn": "arn:m"})),
        );
        let binding = binding(Arc::clone(&invoker));

        let output = binding
            .call("DescribeModel", Record::new().with("model_name", "m"))
            .unwrap()
            .unwrap();
        assert_eq!(output.get_str("model_arn"), Some("arn:m"));
        assert_eq!(invoker.requests("DescribeModel"), vec![WireValue::from(json!({"ModelName": "m"}))]);
    }

    #[test]
    fn test_missing_required_field_is_raised_before_invocation() {
        let invoker = Arc::new(ScriptedInvoker::new());
        let binding = binding(Arc::clone(&invoker));

        let error = binding.call("CreateModel", Record::new().with("model_name", "m")).unwrap_err();
        assert!(matches!(
            error,
            RuntimeError::Model(ModelError::MissingRequiredField { ref field, .. }) if field == "execution_role_arn"
        ));
        assert!(invoker.calls().is_empty());
    }

    #[test]
    fn test_unknown_operation() {
        let binding = binding(Arc::new(ScriptedInvoker::new()));
        let error = binding.call("LaunchRocket", Record::new()).unwrap_err();
        assert!(matches!(error, RuntimeError::UnknownOperation(ref name) if name == "LaunchRocket"));
    }

    #[test]
    fn test_api_error_fields_are_decoded() {
        let invoker = Arc::new(ScriptedInvoker::new().fail(
            "CreateTrainingJob",
            ApiError::new("ResourceInUse", "name taken")
                .with_fields(WireValue::from(json!({"Message": "name taken", "ResourceArn": "arn:job"}))),
        ));
        let binding = binding(invoker);

        let input = Record::new()
            .with("training_job_name", "job")
            .with("role_arn", "arn:role")
            .with("resource_config", Record::new().with("volume_size_in_gb", 10));
        let error = binding.resource("TrainingJob").unwrap().create(input).unwrap_err();

        let RuntimeError::Api(service_error) = error else {
            panic!("expected an API error, got {error}");
        };
        assert_eq!(service_error.code, "ResourceInUse");
        let details = service_error.details.unwrap();
        assert_eq!(details.shape(), Some("ResourceInUse"));
        assert_eq!(details.get_str("resource_arn"), Some("arn:job"));
    }

    #[test]
    fn test_create_reads_identifiers_and_refreshes() {
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .respond("CreateEndpoint", json!({"EndpointArn": "arn:e"}))
                .respond(
                    "DescribeEndpoint",
                    json!({"EndpointName": "e", "EndpointArn": "arn:e", "EndpointStatus": "Creating"}),
                ),
        );
        let binding = binding(Arc::clone(&invoker));

        let endpoint = binding
            .resource("Endpoint")
            .unwrap()
            .create(
                Record::new()
                    .with("endpoint_name", "e")
                    .with("endpoint_config_name", "c"),
            )
            .unwrap();

        assert_eq!(endpoint.identifiers().get_str("endpoint_name"), Some("e"));
        assert_eq!(endpoint.status(), Some("Creating"));
        assert_eq!(
            invoker.requests("DescribeEndpoint"),
            vec![WireValue::from(json!({"EndpointName": "e"}))]
        );
    }

    #[test]
    fn test_unsupported_verbs() {
        let binding = binding(Arc::new(ScriptedInvoker::new()));
        let nodes = binding.resource("ClusterNode").unwrap();
        assert!(matches!(
            nodes.create(Record::new()),
            Err(RuntimeError::OperationNotSupported { ref verb, .. }) if verb == "create"
        ));

        let report = binding.resource("Report").unwrap_err();
        assert!(matches!(report, RuntimeError::UnsupportedResource(_)));
    }

    #[test]
    fn test_custom_verb() {
        let invoker = Arc::new(
            ScriptedInvoker::new()
                .respond(
                    "DescribeTrainingJob",
                    json!({"TrainingJobName": "job", "TrainingJobArn": "arn:job", "TrainingJobStatus": "InProgress"}),
                )
                .respond("StopTrainingJob", json!({})),
        );
        let binding = binding(Arc::clone(&invoker));
        let mut job = binding
            .resource("TrainingJob")
            .unwrap()
            .get(Record::new().with("training_job_name", "job"))
            .unwrap();

        assert_eq!(job.invoke("stop", Record::new()).unwrap(), None);
        assert_eq!(
            invoker.requests("StopTrainingJob"),
            vec![WireValue::from(json!({"TrainingJobName": "job"}))]
        );
        assert!(matches!(
            job.invoke("launch", Record::new()),
            Err(RuntimeError::OperationNotSupported { .. })
        ));
    }

    #[test]
    fn test_wait_for_unknown_status_is_rejected() {
        let invoker = Arc::new(ScriptedInvoker::new().respond(
            "DescribeEndpoint",
            json!({"EndpointName": "e", "EndpointArn": "arn:e", "EndpointStatus": "Creating"}),
        ));
        let binding = binding(Arc::clone(&invoker));
        let mut endpoint = binding
            .resource("Endpoint")
            .unwrap()
            .get(Record::new().with("endpoint_name", "e"))
            .unwrap();

        let error = endpoint
            .wait_for_status("Ready", Duration::from_secs(1), None)
            .unwrap_err();
        assert!(matches!(error, RuntimeError::Model(ModelError::InvalidEnumValue { .. })));
        assert_eq!(invoker.call_count("DescribeEndpoint"), 1);
    }

    #[test]
    fn test_serializable_resource() {
        let invoker = Arc::new(ScriptedInvoker::new().respond(
            "DescribeModel",
            json!({"ModelName": "m", "ModelArn": "arn:m", "CreationTime": 1_704_067_200}),
        ));
        let binding = binding(invoker);
        let model = binding
            .resource("Model")
            .unwrap()
            .get(Record::new().with("model_name", "m"))
            .unwrap();

        assert_eq!(
            model.to_json().unwrap(),
            json!({"ModelName": "m", "ModelArn": "arn:m", "CreationTime": "2024-01-01T00:00:00Z"})
        );
    }
}
