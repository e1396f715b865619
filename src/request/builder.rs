use serde_json::{Map, Value};

use crate::client::message::{OutboundMessage, Payload, QoS};
use crate::client::properties::PublishProperties;
use crate::harness::ext::PostProcess;
use crate::utils::error::Error;

/// Builds broker-call-ready arguments from a substituted request spec.
///
/// The spec is consumed destructively; callers that still need the authored
/// form keep their own copy. No protocol-version check and no network call
/// happens here.
pub fn build_publish_args(
    mut fspec: Map<String, Value>,
    ext: &dyn PostProcess,
) -> Result<OutboundMessage, Error> {
    let properties = match fspec.remove("properties") {
        Some(value) => Some(build_properties(&value)?),
        None => None,
    };

    let payload = resolve_payload(&mut fspec, ext)?;

    let topic = match fspec.remove("topic") {
        Some(Value::String(topic)) => topic,
        Some(_) => {
            return Err(Error::BadValue {
                key: "topic".to_string(),
                expected: "a string",
            });
        }
        None => return Err(Error::MissingKey { key: "topic" }),
    };

    let qos = match fspec.remove("qos") {
        Some(value) => match value.as_u64().and_then(QoS::from_level) {
            Some(qos) => qos,
            None => {
                return Err(Error::BadValue {
                    key: "qos".to_string(),
                    expected: "an integer between 0 and 2",
                });
            }
        },
        None => QoS::default(),
    };

    let retain = match fspec.remove("retain") {
        Some(Value::Bool(retain)) => retain,
        Some(_) => {
            return Err(Error::BadValue {
                key: "retain".to_string(),
                expected: "a boolean",
            });
        }
        None => false,
    };

    Ok(OutboundMessage {
        topic,
        payload,
        qos,
        retain,
        properties,
    })
}

/// Folds the `properties` mapping into a typed property set, assigning
/// entries in input order.
fn build_properties(value: &Value) -> Result<PublishProperties, Error> {
    let entries = value.as_object().ok_or_else(|| Error::BadValue {
        key: "properties".to_string(),
        expected: "a mapping of property names to values",
    })?;

    let mut properties = PublishProperties::default();
    for (name, value) in entries {
        properties.set(name, value)?;
    }

    Ok(properties)
}

/// Resolves the message body: either a raw `payload`, or a `json` value
/// encoded to text after post-processing. Supplying both is a conflict.
fn resolve_payload(
    fspec: &mut Map<String, Value>,
    ext: &dyn PostProcess,
) -> Result<Option<Payload>, Error> {
    if fspec.contains_key("json") {
        if fspec.contains_key("payload") {
            return Err(Error::PayloadConflict);
        }

        ext.update(fspec, &["json"])?;

        let body = fspec.remove("json").ok_or(Error::MissingKey { key: "json" })?;
        let encoded = serde_json::to_string(&body).map_err(Error::Encode)?;
        return Ok(Some(Payload::Text(encoded)));
    }

    match fspec.remove("payload") {
        Some(value) => payload_value(&value).map(Some),
        None => Ok(None),
    }
}

fn payload_value(value: &Value) -> Result<Payload, Error> {
    let expected = "a string, number or byte array";
    match value {
        Value::String(text) => Ok(Payload::Text(text.clone())),
        Value::Number(number) => Ok(Payload::Number(number.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|byte| u8::try_from(byte).ok())
                    .ok_or_else(|| Error::BadValue {
                        key: "payload".to_string(),
                        expected,
                    })
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(Payload::Bytes),
        _ => Err(Error::BadValue {
            key: "payload".to_string(),
            expected,
        }),
    }
}
