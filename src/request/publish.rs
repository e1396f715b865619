use serde_json::{Map, Value};
use tracing::error;

use crate::client::message::OutboundMessage;
use crate::client::session::{ClientError, DeliveryToken, PublishClient};
use crate::harness::context::TestContext;
use crate::harness::report::Reporter;
use crate::request::builder::build_publish_args;
use crate::utils::error::Error;
use crate::utils::keys::check_expected_keys;

/// Keys a publish request spec may carry.
pub const EXPECTED_KEYS: [&str; 6] = ["topic", "payload", "json", "qos", "retain", "properties"];

/// Attachment label for the authored request arguments.
const REQUEST_ATTACHMENT: &str = "publish_request";

/// Resolved publish arguments bound for exactly one invocation.
///
/// Invoking consumes the call, so a second publish attempt from the same
/// binding is impossible.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    message: OutboundMessage,
}

impl PreparedCall {
    /// The wire-ready arguments this call will publish.
    pub fn message(&self) -> &OutboundMessage {
        &self.message
    }

    fn invoke<C: PublishClient>(self, client: &C) -> Result<DeliveryToken, ClientError> {
        client.publish(self.message)
    }
}

/// A single publish request on a client.
///
/// Assembly validates the spec's key set, guards protocol-gated features,
/// substitutes variables and binds the built arguments into a
/// [`PreparedCall`]. The authored (pre-transformation) arguments stay
/// available for reporting and assertions.
pub struct MqttRequest<'a, C: PublishClient> {
    client: &'a C,
    reporter: &'a dyn Reporter,
    prepared: Option<PreparedCall>,
    original_args: Map<String, Value>,
}

impl<'a, C: PublishClient> MqttRequest<'a, C> {
    /// Validates and assembles a request against a client session.
    pub fn new(
        client: &'a C,
        rspec: &Map<String, Value>,
        ctx: &TestContext<'a>,
    ) -> Result<Self, Error> {
        check_expected_keys(&EXPECTED_KEYS, rspec)?;
        check_protocol_support(rspec, client)?;

        let fspec = match ctx.variables.format_map(rspec) {
            Ok(fspec) => fspec,
            Err(err) => {
                error!(%err, "failed to resolve variables in request spec");
                return Err(err);
            }
        };

        // Building the arguments consumes its copy of the spec, so keep a
        // second substituted copy untouched for reporting.
        let original_args = ctx.variables.format_map(rspec)?;

        let message = match build_publish_args(fspec, ctx.ext) {
            Ok(message) => message,
            Err(err) => {
                error!(%err, "failed to build publish arguments");
                return Err(err);
            }
        };

        Ok(Self {
            client,
            reporter: ctx.reporter,
            prepared: Some(PreparedCall { message }),
            original_args,
        })
    }

    /// Executes the publish exactly once.
    ///
    /// The authored arguments are attached to the report before the call
    /// goes out. Client failures come back as [`Error::Publish`] with the
    /// client error preserved as the source; running a second time yields
    /// [`Error::AlreadyExecuted`] without touching the client.
    pub fn run(&mut self) -> Result<DeliveryToken, Error> {
        let prepared = self.prepared.take().ok_or(Error::AlreadyExecuted)?;

        self.reporter
            .attach(REQUEST_ATTACHMENT, &Value::Object(self.original_args.clone()));

        match prepared.invoke(self.client) {
            Ok(token) => Ok(token),
            Err(source) => {
                error!(error = %source, "error publishing");
                Err(Error::Publish(source))
            }
        }
    }

    /// The pending call, until `run` consumes it.
    pub fn prepared_call(&self) -> Option<&PreparedCall> {
        self.prepared.as_ref()
    }

    /// The request as the author wrote it: variable-substituted, but before
    /// payload resolution and properties construction.
    pub fn request_vars(&self) -> &Map<String, Value> {
        &self.original_args
    }
}

impl<'a, C: PublishClient> std::fmt::Debug for MqttRequest<'a, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttRequest")
            .field("prepared", &self.prepared)
            .field("original_args", &self.original_args)
            .finish_non_exhaustive()
    }
}

/// Rejects `properties` on sessions below protocol version 5.
///
/// Only key presence matters, so the raw (pre-substitution) spec is checked.
/// An unspecified version defers to the client.
fn check_protocol_support<C: PublishClient>(
    rspec: &Map<String, Value>,
    client: &C,
) -> Result<(), Error> {
    if !rspec.contains_key("properties") {
        return Ok(());
    }

    let negotiated = client.protocol_version();
    if negotiated.supports_properties() {
        Ok(())
    } else {
        error!(
            %negotiated,
            "publish properties can only be used when the session protocol version is 5"
        );
        Err(Error::ProtocolMismatch { negotiated })
    }
}
