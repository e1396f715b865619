use serde_json::Value;

use crate::utils::error::Error;

/// MQTT v5 message properties attached to a single publish.
///
/// Properties are assigned by name from the spec's `properties` mapping.
/// Each name has a declared value shape; anything else is rejected rather
/// than silently accepted. `UserProperty` is the one name that carries a
/// sequence of key/value pairs instead of a scalar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishProperties {
    pub payload_format_indicator: Option<u8>,
    pub message_expiry_interval: Option<u32>,
    pub topic_alias: Option<u16>,
    pub response_topic: Option<String>,
    pub correlation_data: Option<Vec<u8>>,
    pub content_type: Option<String>,
    pub user_properties: Vec<(String, String)>,
}

impl PublishProperties {
    /// Assigns one named property from its spec value.
    ///
    /// `UserProperty` accepts a sequence of 2-element `[key, value]`
    /// sequences and keeps the pairs in input order.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<(), Error> {
        match name {
            "PayloadFormatIndicator" => {
                self.payload_format_indicator =
                    Some(uint_value(name, value, u64::from(u8::MAX))? as u8);
            }
            "MessageExpiryInterval" => {
                self.message_expiry_interval =
                    Some(uint_value(name, value, u64::from(u32::MAX))? as u32);
            }
            "TopicAlias" => {
                self.topic_alias = Some(uint_value(name, value, u64::from(u16::MAX))? as u16);
            }
            "ResponseTopic" => self.response_topic = Some(str_value(name, value)?),
            "CorrelationData" => self.correlation_data = Some(bytes_value(name, value)?),
            "ContentType" => self.content_type = Some(str_value(name, value)?),
            "UserProperty" => self.user_properties = pairs_value(name, value)?,
            _ => {
                return Err(Error::UnknownProperty {
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }
}

fn bad_value(name: &str, expected: &'static str) -> Error {
    Error::BadValue {
        key: name.to_string(),
        expected,
    }
}

fn uint_value(name: &str, value: &Value, max: u64) -> Result<u64, Error> {
    match value.as_u64() {
        Some(number) if number <= max => Ok(number),
        _ => Err(bad_value(name, "an unsigned integer")),
    }
}

fn str_value(name: &str, value: &Value) -> Result<String, Error> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| bad_value(name, "a string"))
}

fn bytes_value(name: &str, value: &Value) -> Result<Vec<u8>, Error> {
    let expected = "a string or a list of bytes";
    match value {
        Value::String(text) => Ok(text.clone().into_bytes()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|byte| u8::try_from(byte).ok())
                    .ok_or_else(|| bad_value(name, expected))
            })
            .collect(),
        _ => Err(bad_value(name, expected)),
    }
}

fn pairs_value(name: &str, value: &Value) -> Result<Vec<(String, String)>, Error> {
    let expected = "a list of [key, value] string pairs";
    let items = value.as_array().ok_or_else(|| bad_value(name, expected))?;

    items
        .iter()
        .map(|item| match item.as_array().map(Vec::as_slice) {
            Some([Value::String(key), Value::String(val)]) => Ok((key.clone(), val.clone())),
            _ => Err(bad_value(name, expected)),
        })
        .collect()
}
