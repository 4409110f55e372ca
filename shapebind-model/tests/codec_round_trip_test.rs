//! Codec round-trip properties over a small description with nested
//! structures, lists, maps, enums and blobs.

use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::json;
use shapebind_model::{Codec, EnumValue, ModelValue, Record, ServiceDescription, ShapeGraph};

fn graph() -> ShapeGraph {
    let description: ServiceDescription = serde_json::from_value(json!({
        "metadata": {"apiVersion": "2024-01-01", "serviceId": "ModelHub"},
        "operations": {
            "CreateTrainingJob": {"name": "CreateTrainingJob", "input": {"shape": "CreateTrainingJobInput"}}
        },
        "shapes": {
            "CreateTrainingJobInput": {
                "type": "structure",
                "required": ["TrainingJobName", "ResourceConfig"],
                "members": {
                    "TrainingJobName": {"shape": "Name"},
                    "ResourceConfig": {"shape": "ResourceConfig"},
                    "HyperParameters": {"shape": "HyperParameters"},
                    "Tags": {"shape": "TagList"},
                    "Checkpoint": {"shape": "Checkpoint"}
                }
            },
            "ResourceConfig": {
                "type": "structure",
                "required": ["VolumeSizeInGB"],
                "members": {
                    "InstanceType": {"shape": "InstanceType"},
                    "InstanceCount": {"shape": "Count"},
                    "VolumeSizeInGB": {"shape": "Count"}
                }
            },
            "HyperParameters": {"type": "map", "key": {"shape": "Name"}, "value": {"shape": "Name"}},
            "TagList": {"type": "list", "member": {"shape": "Tag"}},
            "Tag": {
                "type": "structure",
                "required": ["Key"],
                "members": {"Key": {"shape": "Name"}, "Value": {"shape": "Name"}}
            },
            "Checkpoint": {"type": "blob"},
            "InstanceType": {"type": "string", "enum": ["ml.m5.large", "ml.p3.2xlarge"]},
            "Count": {"type": "integer"},
            "Name": {"type": "string"}
        }
    }))
    .expect("description should parse");
    ShapeGraph::build(&description).expect("graph should build")
}

fn tag() -> impl Strategy<Value = ModelValue> {
    ("[a-z]{1,8}", proptest::option::of("[a-z0-9]{0,8}")).prop_map(|(key, value)| {
        let mut record = Record::of("Tag").with("key", key);
        if let Some(value) = value {
            record.set("value", value);
        }
        ModelValue::Record(record)
    })
}

fn training_job_input() -> impl Strategy<Value = ModelValue> {
    (
        "[A-Za-z0-9-]{1,20}",
        proptest::option::of(prop_oneof![Just("ml.m5.large"), Just("ml.p3.2xlarge")]),
        proptest::option::of(1_i64..16),
        1_i64..1024,
        proptest::collection::vec(("[a-z_]{1,6}", "[a-z0-9]{0,6}"), 0..4),
        proptest::option::of(proptest::collection::vec(tag(), 0..4)),
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..32)),
    )
        .prop_map(
            |(name, instance_type, count, volume, params, tags, checkpoint)| {
                let mut resource = Record::of("ResourceConfig").with("volume_size_in_gb", volume);
                if let Some(instance_type) = instance_type {
                    resource.set(
                        "instance_type",
                        ModelValue::Enum(EnumValue::Known(instance_type.to_string())),
                    );
                }
                if let Some(count) = count {
                    resource.set("instance_count", count);
                }

                let mut record = Record::of("CreateTrainingJobInput")
                    .with("training_job_name", name)
                    .with("resource_config", resource);
                if !params.is_empty() {
                    let map: IndexMap<String, ModelValue> = params
                        .into_iter()
                        .map(|(key, value)| (key, ModelValue::String(value)))
                        .collect();
                    record.set("hyper_parameters", ModelValue::Map(map));
                }
                if let Some(tags) = tags {
                    record.set("tags", ModelValue::List(tags));
                }
                if let Some(checkpoint) = checkpoint {
                    record.set("checkpoint", ModelValue::Blob(checkpoint));
                }
                ModelValue::Record(record)
            },
        )
}

/// Input spelled the lenient way encode accepts, paired with the canonical
/// value decode should produce for it.
fn lenient_training_job_input() -> impl Strategy<Value = (ModelValue, ModelValue)> {
    (
        "[A-Za-z0-9-]{1,20}",
        prop_oneof![Just("ml.m5.large"), Just("ml.p3.2xlarge")],
        1_i64..1024,
        any::<bool>(),
        proptest::option::of("[a-z0-9]{0,16}"),
    )
        .prop_map(|(name, instance_type, volume, null_tags, checkpoint)| {
            let lenient_resource = Record::of("ResourceConfig")
                .with("volume_size_in_gb", volume)
                .with("instance_type", ModelValue::String(instance_type.to_string()))
                .with("instance_count", ModelValue::Null);
            let canonical_resource = Record::of("ResourceConfig")
                .with("volume_size_in_gb", volume)
                .with(
                    "instance_type",
                    ModelValue::Enum(EnumValue::Known(instance_type.to_string())),
                );

            let mut lenient = Record::of("CreateTrainingJobInput")
                .with("training_job_name", name.clone())
                .with("resource_config", lenient_resource);
            let mut canonical = Record::of("CreateTrainingJobInput")
                .with("training_job_name", name)
                .with("resource_config", canonical_resource);
            if null_tags {
                lenient.set("tags", ModelValue::Null);
            }
            if let Some(text) = checkpoint {
                canonical.set("checkpoint", ModelValue::Blob(text.as_bytes().to_vec()));
                lenient.set("checkpoint", ModelValue::String(text));
            }
            (ModelValue::Record(lenient), ModelValue::Record(canonical))
        })
}

proptest! {
    #[test]
    fn prop_decode_canonicalizes_lenient_input((lenient, canonical) in lenient_training_job_input()) {
        let graph = graph();
        let codec = Codec::new(&graph);
        let shape = graph.shape_id("CreateTrainingJobInput").expect("input shape");

        let wire = codec.encode(&lenient, shape).expect("lenient input should encode");
        prop_assert_eq!(&wire, &codec.encode(&canonical, shape).expect("canonical input should encode"));

        let decoded = codec.decode(&wire, shape).expect("encoded input should decode");
        prop_assert_eq!(decoded, canonical);
    }

    #[test]
    fn prop_decode_inverts_encode(input in training_job_input()) {
        let graph = graph();
        let codec = Codec::new(&graph);
        let shape = graph.shape_id("CreateTrainingJobInput").expect("input shape");

        let wire = codec.encode(&input, shape).expect("valid input should encode");
        let decoded = codec.decode(&wire, shape).expect("encoded input should decode");

        prop_assert_eq!(decoded, input);
    }
}

#[test_log::test]
fn test_wire_names_restore_acronyms() {
    let graph = graph();
    let codec = Codec::new(&graph);
    let shape = graph.shape_id("CreateTrainingJobInput").expect("input shape");
    let input = Record::new()
        .with("training_job_name", "job")
        .with("resource_config", Record::new().with("volume_size_in_gb", 50));

    let wire = codec.encode_record(&input, shape).expect("encode");

    assert_eq!(
        wire.to_json(),
        json!({"TrainingJobName": "job", "ResourceConfig": {"VolumeSizeInGB": 50}})
    );
    assert_eq!(
        graph.names().to_wire_name("volume_size_in_gb"),
        "VolumeSizeInGB"
    );
}
