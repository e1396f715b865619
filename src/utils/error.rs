//! The `error` module defines the error types raised while assembling and
//! executing publish requests.
//!
//! Every variant is fatal to the test step it occurs in: nothing is retried
//! internally, and errors propagate to the step runner unmodified in kind.

use crate::client::session::{ClientError, ProtocolVersion};

/// Errors surfaced by the request pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The spec carries keys outside the recognized set.
    #[error("unexpected keys in publish request: {unexpected:?}")]
    UnexpectedKeys { unexpected: Vec<String> },

    #[error("publish request is missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("'{key}' must be {expected}")]
    BadValue { key: String, expected: &'static str },

    /// Both `payload` and `json` were supplied for the same request.
    #[error("can only specify one of 'payload' or 'json' in an MQTT request")]
    PayloadConflict,

    #[error("unknown publish property '{name}'")]
    UnknownProperty { name: String },

    #[error("no value for variable '{name}'")]
    MissingVariable { name: String },

    /// `properties` was supplied on a session below protocol version 5.
    #[error(
        "publish properties can only be used when the session protocol version is 5, negotiated {negotiated}"
    )]
    ProtocolMismatch { negotiated: ProtocolVersion },

    #[error("failed to encode 'json' body")]
    Encode(#[source] serde_json::Error),

    /// The underlying publish raised a value-level error.
    #[error("error publishing")]
    Publish(#[source] ClientError),

    #[error("publish request was already executed")]
    AlreadyExecuted,
}
