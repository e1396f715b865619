//! The `request` module is the pipeline from a declarative request spec to
//! a single publish on a client session.
//!
//! A spec flows one way: key-set validation, the protocol guard, variable
//! substitution, argument building, and a single-shot prepared call — with
//! a side copy of the authored arguments preserved for reporting and
//! assertions.

pub mod builder;
pub mod publish;

pub use builder::build_publish_args;
pub use publish::{EXPECTED_KEYS, MqttRequest, PreparedCall};

#[cfg(test)]
mod tests;
