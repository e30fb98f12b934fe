//! Telemetry utilities for service command timing and tracing spans.

use std::time::Instant;
use tracing::debug;

/// Guard for timing service command execution.
///
/// Logs the command latency when dropped.
pub struct CommandTimer {
    service: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command sent to `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let micros = self.start.elapsed().as_micros() as u64;
        debug!(service = %self.service, elapsed_us = micros, "Service command handled");
    }
}

/// Standardized span constructors for services observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for a command sent to a service.
    pub fn command(service: &str, source: &str, channel: Option<&str>) -> Span {
        if let Some(channel) = channel {
            info_span!("command", service = %service, source = %source, channel = %channel)
        } else {
            info_span!("command", service = %service, source = %source)
        }
    }
}
