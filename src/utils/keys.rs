use serde_json::{Map, Value};
use tracing::error;

use crate::utils::error::Error;

/// Rejects any key of `spec` that is not in the `expected` set.
///
/// Runs before any other processing of a request, so a misspelled key fails
/// the step without side effects.
pub fn check_expected_keys(expected: &[&str], spec: &Map<String, Value>) -> Result<(), Error> {
    let unexpected: Vec<String> = spec
        .keys()
        .filter(|key| !expected.contains(&key.as_str()))
        .cloned()
        .collect();

    if unexpected.is_empty() {
        Ok(())
    } else {
        error!(?unexpected, ?expected, "unexpected keys in request spec");
        Err(Error::UnexpectedKeys { unexpected })
    }
}
