use std::cell::RefCell;
use std::error::Error as _;

use serde_json::{Map, Value, json};

use super::builder::build_publish_args;
use super::publish::MqttRequest;
use crate::client::message::{OutboundMessage, Payload, QoS};
use crate::client::session::{ClientError, DeliveryToken, ProtocolVersion, PublishClient};
use crate::harness::context::TestContext;
use crate::harness::ext::{NoPostProcess, PostProcess};
use crate::harness::report::Reporter;
use crate::harness::vars::VarMap;
use crate::utils::error::Error;

/// Client double that records published messages instead of hitting the wire.
struct RecordingClient {
    protocol: ProtocolVersion,
    published: RefCell<Vec<OutboundMessage>>,
    fail_with: RefCell<Option<ClientError>>,
}

impl RecordingClient {
    fn with_protocol(protocol: ProtocolVersion) -> Self {
        Self {
            protocol,
            published: RefCell::new(Vec::new()),
            fail_with: RefCell::new(None),
        }
    }
}

impl PublishClient for RecordingClient {
    fn protocol_version(&self) -> ProtocolVersion {
        self.protocol
    }

    fn publish(&self, message: OutboundMessage) -> Result<DeliveryToken, ClientError> {
        if let Some(err) = self.fail_with.borrow_mut().take() {
            return Err(err);
        }
        let mut published = self.published.borrow_mut();
        published.push(message);
        Ok(DeliveryToken(published.len() as u16))
    }
}

/// Reporter double that records attachments in arrival order.
#[derive(Default)]
struct RecordingReporter {
    attachments: RefCell<Vec<(String, Value)>>,
}

impl Reporter for RecordingReporter {
    fn attach(&self, name: &str, body: &Value) {
        self.attachments
            .borrow_mut()
            .push((name.to_string(), body.clone()));
    }
}

fn spec(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other:?}"),
    }
}

#[test]
fn test_json_body_becomes_payload() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({"topic": "t/1", "json": {"a": 1}, "qos": 1}));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();
    let token = request.run().unwrap();
    assert_eq!(token, DeliveryToken(1));

    let published = client.published.borrow();
    assert_eq!(published.len(), 1);
    let message = &published[0];
    assert_eq!(message.topic, "t/1");
    assert_eq!(message.payload, Some(Payload::Text("{\"a\":1}".to_string())));
    assert_eq!(message.qos, QoS::AtLeastOnce);
    assert!(!message.retain);
    assert!(message.properties.is_none());
}

#[test]
fn test_payload_and_json_conflict() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({"topic": "t/1", "payload": "raw", "json": {"a": 1}}));
    let err = MqttRequest::new(&client, &rspec, &ctx).unwrap_err();
    assert!(matches!(err, Error::PayloadConflict));

    // no publish attempt was made
    assert!(client.published.borrow().is_empty());
}

#[test]
fn test_properties_rejected_below_protocol_5() {
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({
        "topic": "t/2",
        "payload": "hello",
        "properties": {"UserProperty": [["x", "y"]]}
    }));

    for protocol in [ProtocolVersion::V3, ProtocolVersion::V4] {
        let client = RecordingClient::with_protocol(protocol);
        let err = MqttRequest::new(&client, &rspec, &ctx).unwrap_err();
        assert!(matches!(err, Error::ProtocolMismatch { negotiated } if negotiated == protocol));
        assert!(client.published.borrow().is_empty());
    }
}

#[test]
fn test_properties_allowed_when_protocol_unspecified() {
    let client = RecordingClient::with_protocol(ProtocolVersion::Unspecified);
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({
        "topic": "t/2",
        "payload": "hello",
        "properties": {"ContentType": "text/plain"}
    }));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();
    request.run().unwrap();

    let published = client.published.borrow();
    let properties = published[0].properties.as_ref().unwrap();
    assert_eq!(properties.content_type.as_deref(), Some("text/plain"));
}

#[test]
fn test_properties_built_in_input_order() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({
        "topic": "t/3",
        "properties": {
            "UserProperty": [["k1", "v1"], ["k2", "v2"]],
            "ContentType": "text/plain"
        }
    }));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();
    request.run().unwrap();

    let published = client.published.borrow();
    let properties = published[0].properties.as_ref().unwrap();
    assert_eq!(
        properties.user_properties,
        vec![
            ("k1".to_string(), "v1".to_string()),
            ("k2".to_string(), "v2".to_string()),
        ]
    );
    assert_eq!(properties.content_type.as_deref(), Some("text/plain"));
}

#[test]
fn test_unexpected_key_rejected() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({"topic": "t/1", "shenanigans": true}));
    let err = MqttRequest::new(&client, &rspec, &ctx).unwrap_err();
    match err {
        Error::UnexpectedKeys { unexpected } => {
            assert_eq!(unexpected, vec!["shenanigans".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.published.borrow().is_empty());
}

#[test]
fn test_request_vars_round_trip() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let mut vars = VarMap::new();
    vars.insert("topic_prefix", json!("devices"));
    vars.insert("qos_level", json!(2));
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({
        "topic": "{topic_prefix}/42/state",
        "json": {"on": true},
        "qos": "{qos_level}"
    }));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();

    // the accessor sees the substituted spec as authored: `json` still
    // structured, nothing replaced by the built arguments
    let expected = spec(json!({
        "topic": "devices/42/state",
        "json": {"on": true},
        "qos": 2
    }));
    assert_eq!(request.request_vars(), &expected);

    request.run().unwrap();
    assert_eq!(request.request_vars(), &expected);

    let published = client.published.borrow();
    assert_eq!(published[0].topic, "devices/42/state");
    assert_eq!(published[0].qos, QoS::ExactlyOnce);
}

#[test]
fn test_publish_failure_wraps_client_error() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    *client.fail_with.borrow_mut() = Some(ClientError::InvalidPayload {
        reason: "too large".to_string(),
    });
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({"topic": "t/err", "payload": "boom"}));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();
    let err = request.run().unwrap_err();

    assert!(matches!(
        err,
        Error::Publish(ClientError::InvalidPayload { .. })
    ));
    assert!(err.source().is_some());

    // the attachment went out before the failure
    let attachments = reporter.attachments.borrow();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].0, "publish_request");
    assert_eq!(attachments[0].1, json!({"topic": "t/err", "payload": "boom"}));
}

#[test]
fn test_run_is_single_shot() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({"topic": "t/once", "payload": "hi"}));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();

    assert_eq!(
        request.prepared_call().unwrap().message().topic,
        "t/once".to_string()
    );

    request.run().unwrap();
    assert!(request.prepared_call().is_none());

    let err = request.run().unwrap_err();
    assert!(matches!(err, Error::AlreadyExecuted));

    // the client saw exactly one publish, and only one attachment was emitted
    assert_eq!(client.published.borrow().len(), 1);
    assert_eq!(reporter.attachments.borrow().len(), 1);
}

#[test]
fn test_ext_hook_rewrites_json_body() {
    /// Hook that swaps every named key's value for a marker object.
    struct Rewrite;

    impl PostProcess for Rewrite {
        fn update(&self, spec: &mut Map<String, Value>, keys: &[&str]) -> Result<(), Error> {
            for key in keys {
                if let Some(value) = spec.get_mut(*key) {
                    *value = json!({"rewritten": true});
                }
            }
            Ok(())
        }
    }

    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let vars = VarMap::new();
    let ext = Rewrite;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({"topic": "t/ext", "json": {"a": 1}}));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();
    request.run().unwrap();

    let published = client.published.borrow();
    assert_eq!(
        published[0].payload,
        Some(Payload::Text("{\"rewritten\":true}".to_string()))
    );

    // the accessor still shows the authored body
    assert_eq!(request.request_vars().get("json"), Some(&json!({"a": 1})));
}

#[test]
fn test_defaults_when_payload_absent() {
    let client = RecordingClient::with_protocol(ProtocolVersion::V5);
    let vars = VarMap::new();
    let ext = NoPostProcess;
    let reporter = RecordingReporter::default();
    let ctx = TestContext::new(&vars, &ext, &reporter);

    let rspec = spec(json!({"topic": "t/empty"}));
    let mut request = MqttRequest::new(&client, &rspec, &ctx).unwrap();
    request.run().unwrap();

    let published = client.published.borrow();
    let message = &published[0];
    assert_eq!(message.payload, None);
    assert_eq!(message.qos, QoS::AtMostOnce);
    assert!(!message.retain);
}

#[test]
fn test_build_accepts_byte_and_number_payloads() {
    let ext = NoPostProcess;

    let message = build_publish_args(spec(json!({"topic": "t", "payload": [1, 2, 255]})), &ext)
        .unwrap();
    assert_eq!(message.payload, Some(Payload::Bytes(vec![1, 2, 255])));

    let message = build_publish_args(spec(json!({"topic": "t", "payload": 17})), &ext).unwrap();
    assert_eq!(
        message.payload,
        Some(Payload::Number(serde_json::Number::from(17)))
    );
}

#[test]
fn test_build_passes_retain_through() {
    let ext = NoPostProcess;
    let message =
        build_publish_args(spec(json!({"topic": "t", "retain": true})), &ext).unwrap();
    assert!(message.retain);
}

#[test]
fn test_build_rejects_bad_values() {
    let ext = NoPostProcess;

    let err = build_publish_args(spec(json!({"topic": "t", "qos": 5})), &ext).unwrap_err();
    assert!(matches!(err, Error::BadValue { key, .. } if key == "qos"));

    let err = build_publish_args(spec(json!({"topic": "t", "payload": true})), &ext).unwrap_err();
    assert!(matches!(err, Error::BadValue { key, .. } if key == "payload"));

    let err = build_publish_args(spec(json!({"topic": 7, "payload": "x"})), &ext).unwrap_err();
    assert!(matches!(err, Error::BadValue { key, .. } if key == "topic"));

    let err = build_publish_args(spec(json!({"payload": "x"})), &ext).unwrap_err();
    assert!(matches!(err, Error::MissingKey { key: "topic" }));
}
