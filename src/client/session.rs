use std::fmt;

use crate::client::message::OutboundMessage;

/// MQTT protocol revision negotiated when a session was set up.
///
/// `Unspecified` is the sentinel for sessions that never declared a
/// version; it is treated as compatible with every request form, deferring
/// to the client's own behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// MQTT 3.1, wire level 3.
    V3,
    /// MQTT 3.1.1, wire level 4.
    V4,
    /// MQTT 5, wire level 5.
    V5,
    #[default]
    Unspecified,
}

impl ProtocolVersion {
    /// Maps the numeric protocol level used in client configuration.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            3 => Some(ProtocolVersion::V3),
            4 => Some(ProtocolVersion::V4),
            5 => Some(ProtocolVersion::V5),
            _ => None,
        }
    }

    /// Whether a session at this version may carry publish properties.
    pub fn supports_properties(self) -> bool {
        matches!(self, ProtocolVersion::V5 | ProtocolVersion::Unspecified)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V3 => write!(f, "3"),
            ProtocolVersion::V4 => write!(f, "4"),
            ProtocolVersion::V5 => write!(f, "5"),
            ProtocolVersion::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Token the client hands back for an accepted publish, carrying the
/// assigned packet id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryToken(pub u16);

/// Value-level failures a client can raise while publishing.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("payload cannot be encoded for the wire: {reason}")]
    InvalidPayload { reason: String },

    #[error("'{topic}' is not a valid publish topic")]
    InvalidTopic { topic: String },

    #[error("client rejected the publish: {reason}")]
    Rejected { reason: String },
}

/// Publish capability of a connected MQTT session.
///
/// Implemented by the real network client outside this crate; tests use
/// in-memory recording implementations. Connection and session lifecycle
/// belong to the implementor, not to the request layer.
pub trait PublishClient {
    /// Protocol version negotiated for the session.
    fn protocol_version(&self) -> ProtocolVersion;

    /// Publish a single message, returning the assigned delivery token.
    fn publish(&self, message: OutboundMessage) -> Result<DeliveryToken, ClientError>;
}
