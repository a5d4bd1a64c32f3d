//! Human-readable status reporting.
//!
//! Components never print directly. Every user-facing message goes through a
//! `StatusSink` injected by the host (a GUI log pane, the CLI console, a test
//! recorder). Diagnostics for developers still go through `tracing`.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

pub trait StatusSink: Send + Sync {
    fn status(&self, message: &str);
}

impl<F> StatusSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn status(&self, message: &str) {
        self(message)
    }
}

/// Sink that drops status messages (kept at debug level for diagnosis)
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietSink;

impl StatusSink for QuietSink {
    fn status(&self, message: &str) {
        debug!("(suppressed) {}", message);
    }
}

/// Sink that collects messages in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl StatusSink for MemorySink {
    fn status(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_messages() {
        let sink = MemorySink::new();
        sink.status("Kill logged.");
        sink.status("You DIED.");
        assert_eq!(sink.messages(), vec!["Kill logged.", "You DIED."]);
        assert!(sink.contains("DIED"));
    }

    #[test]
    fn test_closure_as_sink() {
        let sink = MemorySink::new();
        let forward = {
            let sink = sink.clone();
            move |message: &str| sink.status(&format!("[ui] {}", message))
        };
        let dyn_sink: Arc<dyn StatusSink> = Arc::new(forward);
        dyn_sink.status("hello");
        assert_eq!(sink.messages(), vec!["[ui] hello"]);
    }
}
