//! Resource lifecycle against the embedded ModelHub description
//!
//! Drives create, wait, list and delete through a scripted invoker and a
//! manual clock, the way a caller would use the public API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shapebind_model::Record;
use shapebind_runtime::testing::{ManualClock, ScriptedInvoker};
use shapebind_runtime::{
    ApiError, CancellationToken, DefaultsDocument, Identifiable, RuntimeError, ServiceBinding,
    WaitOptions, Waitable,
};

fn describe_endpoint(status: &str) -> serde_json::Value {
    json!({
        "EndpointName": "my-endpoint",
        "EndpointArn": "arn:endpoint/my-endpoint",
        "EndpointStatus": status,
        "FailureReason": if status == "Failed" { json!("model image missing") } else { json!(null) }
    })
}

fn binding(invoker: &Arc<ScriptedInvoker>, clock: &Arc<ManualClock>) -> ServiceBinding {
    ServiceBinding::from_embedded("modelhub", "2024-01-01", Arc::clone(invoker) as _)
        .unwrap()
        .with_defaults(DefaultsDocument::default())
        .with_clock(Arc::clone(clock) as _)
}

fn endpoint_input() -> Record {
    Record::new()
        .with("endpoint_name", "my-endpoint")
        .with("endpoint_config_name", "my-config")
}

#[test_log::test]
fn test_create_then_wait_until_in_service() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .respond("CreateEndpoint", json!({"EndpointArn": "arn:endpoint/my-endpoint"}))
            .respond("DescribeEndpoint", describe_endpoint("Creating"))
            .respond("DescribeEndpoint", describe_endpoint("Creating"))
            .respond("DescribeEndpoint", describe_endpoint("InService")),
    );
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);

    let mut endpoint = binding.resource("Endpoint").unwrap().create(endpoint_input()).unwrap();
    assert_eq!(endpoint.status(), Some("Creating"));
    assert_eq!(invoker.call_count("DescribeEndpoint"), 1);

    endpoint
        .wait_for_status("InService", Duration::from_secs(30), Some(Duration::from_secs(600)))
        .unwrap();

    // Creating, then InService
    assert_eq!(invoker.call_count("DescribeEndpoint"), 3);
    assert_eq!(endpoint.status(), Some("InService"));
    assert_eq!(clock.elapsed(), Duration::from_secs(30));
    assert_eq!(endpoint.identifiers().get_str("endpoint_name"), Some("my-endpoint"));
}

#[test_log::test]
fn test_failure_status_raises_without_further_polls() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .respond("DescribeEndpoint", describe_endpoint("Creating"))
            .respond("DescribeEndpoint", describe_endpoint("Failed")),
    );
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);
    let mut endpoint = binding
        .resource("Endpoint")
        .unwrap()
        .get(Record::new().with("endpoint_name", "my-endpoint"))
        .unwrap();

    let error = endpoint.wait(Duration::from_secs(10), None).unwrap_err();
    match error {
        RuntimeError::WaitFailure { status, reason, .. } => {
            assert_eq!(status, "Failed");
            assert_eq!(reason.as_deref(), Some("model image missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(invoker.call_count("DescribeEndpoint"), 2);
    assert_eq!(clock.sleeps(), 0);
}

#[test_log::test]
fn test_wait_times_out_with_last_status() {
    let invoker = Arc::new(ScriptedInvoker::new().respond("DescribeEndpoint", describe_endpoint("Updating")));
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);
    let mut endpoint = binding
        .resource("Endpoint")
        .unwrap()
        .get(Record::new().with("endpoint_name", "my-endpoint"))
        .unwrap();

    let error = endpoint
        .wait_for_status("InService", Duration::from_secs(20), Some(Duration::from_secs(60)))
        .unwrap_err();
    assert!(matches!(
        error,
        RuntimeError::WaitTimeout { ref status, elapsed, .. }
            if status.as_deref() == Some("Updating") && elapsed == Duration::from_secs(60)
    ));
}

#[test_log::test]
fn test_wait_for_delete_ends_on_not_found() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .respond("DeleteEndpoint", json!({}))
            .respond("DescribeEndpoint", describe_endpoint("InService"))
            .respond("DescribeEndpoint", describe_endpoint("Deleting"))
            .fail("DescribeEndpoint", ApiError::new("ResourceNotFound", "gone")),
    );
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);
    let mut endpoint = binding
        .resource("Endpoint")
        .unwrap()
        .get(Record::new().with("endpoint_name", "my-endpoint"))
        .unwrap();

    endpoint.delete().unwrap();
    endpoint
        .wait_for_delete(Duration::from_secs(5), Some(Duration::from_secs(60)))
        .unwrap();
    assert_eq!(invoker.call_count("DeleteEndpoint"), 1);
    assert_eq!(invoker.call_count("DescribeEndpoint"), 3);
}

#[test_log::test]
fn test_cancelled_wait() {
    let invoker = Arc::new(ScriptedInvoker::new().respond("DescribeEndpoint", describe_endpoint("Creating")));
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);
    let mut endpoint = binding
        .resource("Endpoint")
        .unwrap()
        .get(Record::new().with("endpoint_name", "my-endpoint"))
        .unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let options = WaitOptions::new(Duration::from_secs(1), None).with_cancellation(token);
    let error = endpoint.wait_with(&options).unwrap_err();
    assert!(matches!(error, RuntimeError::Cancelled { .. }));
}

#[test_log::test]
fn test_concurrent_waits_share_the_binding() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .respond(
                "DescribeTrainingJob",
                json!({"TrainingJobName": "job", "TrainingJobArn": "arn:job", "TrainingJobStatus": "Completed"}),
            )
            .respond("DescribeEndpoint", describe_endpoint("InService")),
    );
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);

    std::thread::scope(|scope| {
        let training = scope.spawn(|| {
            let mut job = binding
                .resource("TrainingJob")
                .unwrap()
                .get(Record::new().with("training_job_name", "job"))
                .unwrap();
            job.wait(Duration::from_secs(1), None).map(|()| job.status().map(str::to_string))
        });
        let serving = scope.spawn(|| {
            let mut endpoint = binding
                .resource("Endpoint")
                .unwrap()
                .get(Record::new().with("endpoint_name", "my-endpoint"))
                .unwrap();
            endpoint
                .wait_for_status("InService", Duration::from_secs(1), None)
                .map(|()| endpoint.status().map(str::to_string))
        });

        assert_eq!(training.join().unwrap().unwrap().as_deref(), Some("Completed"));
        assert_eq!(serving.join().unwrap().unwrap().as_deref(), Some("InService"));
    });
}

#[test_log::test]
fn test_list_follows_tokens_and_restarts() {
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .respond(
                "ListTrainingJobs",
                json!({
                    "TrainingJobSummaries": [
                        {"TrainingJobName": "a", "TrainingJobArn": "arn:a", "TrainingJobStatus": "Completed"}
                    ],
                    "NextToken": "page-2"
                }),
            )
            .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [], "NextToken": "page-3"}))
            .respond(
                "ListTrainingJobs",
                json!({
                    "TrainingJobSummaries": [
                        {"TrainingJobName": "b", "TrainingJobArn": "arn:b", "TrainingJobStatus": "Training"}
                    ]
                }),
            ),
    );
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);

    let listing = binding
        .resource("TrainingJob")
        .unwrap()
        .list(Record::new().with("status_equals", "Completed"))
        .unwrap();
    assert!(invoker.calls().is_empty());

    let names: Vec<String> = listing
        .iter()
        .map(|item| item.unwrap().get_str("training_job_name").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b"]);

    let requests = invoker.requests("ListTrainingJobs");
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].get("NextToken").and_then(|t| t.as_str()), Some("page-2"));
    assert_eq!(requests[2].get("NextToken").and_then(|t| t.as_str()), Some("page-3"));

    // the scripted invoker now repeats the last page, which has no token
    assert_eq!(listing.collect_all().unwrap().len(), 1);
}

#[test_log::test]
fn test_repeated_token_is_a_protocol_error() {
    let page = json!({
        "ClusterNodeSummaries": [{"ClusterName": "c", "InstanceId": "i-1"}],
        "NextToken": "same"
    });
    let invoker = Arc::new(ScriptedInvoker::new().respond("ListClusterNodes", page));
    let clock = Arc::new(ManualClock::new());
    let binding = binding(&invoker, &clock);

    let nodes = binding.resource("ClusterNode").unwrap();
    assert!(nodes.definition().is_list_only());

    let listing = nodes.list(Record::new().with("cluster_name", "c")).unwrap();
    let results: Vec<_> = listing.iter().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(RuntimeError::Pagination { ref token, .. }) if token == "same"));
    assert_eq!(invoker.call_count("ListClusterNodes"), 2);
}
