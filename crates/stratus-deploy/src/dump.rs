//! Debug dump side-channel.

use serde::Serialize;
use tracing::warn;

/// Dumps request/response bodies to process output when enabled.
///
/// Passed explicitly to the executor and orchestrator rather than read from
/// process-wide state, so the core stays testable without global flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugSink {
    enabled: bool,
}

impl DebugSink {
    /// Create a sink; a disabled sink swallows every dump.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Returns true if dumping is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pretty-print a value to standard output under a label.
    pub fn dump<T: Serialize>(&self, label: &str, value: &T) {
        if !self.enabled {
            return;
        }

        match serde_json::to_string_pretty(value) {
            Ok(body) => println!("{label}:\n{body}"),
            Err(e) => warn!(label, error = %e, "failed to serialise debug dump"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        assert!(!DebugSink::default().is_enabled());
        assert!(DebugSink::new(true).is_enabled());
    }
}
