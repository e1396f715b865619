use crate::harness::ext::PostProcess;
use crate::harness::report::Reporter;
use crate::harness::vars::VarMap;

/// Collaborators a single test step hands to the request layer.
///
/// Built once per step and discarded with it; the request keeps only the
/// borrows it needs past assembly.
pub struct TestContext<'a> {
    /// Variable table used to resolve placeholders in the spec.
    pub variables: &'a VarMap,
    /// Post-processing hook for structured bodies.
    pub ext: &'a dyn PostProcess,
    /// Report attachment sink.
    pub reporter: &'a dyn Reporter,
}

impl<'a> TestContext<'a> {
    pub fn new(
        variables: &'a VarMap,
        ext: &'a dyn PostProcess,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            variables,
            ext,
            reporter,
        }
    }
}
