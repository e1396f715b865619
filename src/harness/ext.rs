use serde_json::{Map, Value};

use crate::utils::error::Error;

/// Post-processing hook applied to named spec keys before they are
/// finalized into publish arguments.
///
/// Implementations rewrite the named keys' values in place according to
/// externally registered rules; keys not named stay untouched.
pub trait PostProcess {
    fn update(&self, spec: &mut Map<String, Value>, keys: &[&str]) -> Result<(), Error>;
}

/// Post-processing that leaves every value untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPostProcess;

impl PostProcess for NoPostProcess {
    fn update(&self, _spec: &mut Map<String, Value>, _keys: &[&str]) -> Result<(), Error> {
        Ok(())
    }
}
