use serde_json::Number;

use crate::client::properties::PublishProperties;

/// Delivery-guarantee level for a published message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl QoS {
    /// Maps a numeric qos level to the enum. Levels outside 0-2 have no
    /// meaning and yield `None`.
    pub fn from_level(level: u64) -> Option<Self> {
        match level {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }

    /// Numeric level as it appears on the wire.
    pub fn level(self) -> u8 {
        match self {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

/// Message body in one of the forms a broker client accepts.
///
/// Authors write the body as a string, a byte sequence or a bare number;
/// the client decides the wire encoding via [`Payload::into_bytes`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
    Number(Number),
}

impl Payload {
    /// Wire rendition of the body. Numbers publish as their decimal text.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Bytes(bytes) => bytes,
            Payload::Number(number) => number.to_string().into_bytes(),
        }
    }
}

/// A single message ready to hand to the publish capability.
///
/// This is the fully resolved form of a request spec: the topic to publish
/// on, an optional body, delivery options and optional v5 properties. The
/// client's own default applies when `payload` is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Option<Payload>,
    pub qos: QoS,
    pub retain: bool,
    pub properties: Option<PublishProperties>,
}
