//! The `client` module defines the types shared with the MQTT publish
//! capability: message forms, v5 publish properties and the session trait
//! the request layer drives.
//!
//! The network client itself lives outside this crate; it implements
//! [`PublishClient`] and owns connection and session lifecycle.

pub mod message;
pub mod properties;
pub mod session;

pub use message::{OutboundMessage, Payload, QoS};
pub use properties::PublishProperties;
pub use session::{ClientError, DeliveryToken, ProtocolVersion, PublishClient};
