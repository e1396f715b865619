//! The `harness` module holds the collaborator seams a test step hands to
//! the request layer: variable substitution, post-processing of structured
//! bodies, and report attachments.
//!
//! Each seam is a small trait with a minimal in-repo implementation, so the
//! crate is usable stand-alone while a full test runner can plug in its own
//! machinery.

pub mod context;
pub mod ext;
pub mod report;
pub mod vars;

pub use context::TestContext;
pub use ext::{NoPostProcess, PostProcess};
pub use report::{LogReporter, Reporter};
pub use vars::VarMap;
