//! Audit event sink for import runs.
//!
//! # Responsibility
//! - Define the narrow interface the engine uses to report structured
//!   events (state transitions, rejections, final stats).
//! - Provide the default log-backed sink.
//!
//! # Invariants
//! - Audit context carries metadata only, never file content.

use log::info;

/// Ordered key/value metadata attached to one audit event.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pairs: Vec<(&'static str, String)>,
}

impl AuditContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// Consumer of structured import events.
///
/// The surrounding product routes these into its audit log; the engine
/// only depends on this trait.
pub trait AuditSink {
    fn record(&self, event: &str, context: &AuditContext);
}

/// Default sink writing audit events to the process log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, event: &str, context: &AuditContext) {
        let mut line = format!("event={event} module=import");
        for (key, value) in context.pairs() {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            // Keep the key=value line grep-able even when values carry
            // spaces or newlines.
            line.push_str(&value.replace(['\n', '\r'], " ").replace(' ', "_"));
        }
        info!("{line}");
    }
}
