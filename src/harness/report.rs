use chrono::Utc;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// Sink for named report attachments.
///
/// The test runner decides where attachments land; the request layer only
/// pushes them and observes nothing back.
pub trait Reporter {
    /// Attaches a named JSON payload to the active test report.
    fn attach(&self, name: &str, body: &Value);
}

/// Reporter that writes attachments to the log stream, with a fresh id per
/// attachment so runs can be correlated.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn attach(&self, name: &str, body: &Value) {
        let attachment_id = Uuid::new_v4();
        info!(
            %attachment_id,
            name,
            attached_at = %Utc::now().to_rfc3339(),
            body = %body,
            "report attachment"
        );
    }
}
