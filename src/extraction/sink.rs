//! Diagnostic sinks for the reply extractor.
//!
//! The extractor never configures logging itself; callers hand it a sink.

use super::Shape;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Receives diagnostics produced while extracting structured replies
pub trait DiagnosticSink: Send + Sync {
    /// A strategy produced a value of the requested shape
    fn strategy_matched(&self, _strategy: &'static str, _shape: Shape) {}

    /// Every strategy failed; `preview` holds the head of the raw reply
    fn extraction_failed(&self, shape: Shape, preview: &str);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn strategy_matched(&self, strategy: &'static str, shape: Shape) {
        debug!("Extracted {} from model reply via {}", shape, strategy);
    }

    fn extraction_failed(&self, shape: Shape, preview: &str) {
        warn!("Could not parse {} from AI response: {}...", shape, preview);
    }
}

/// Drops every diagnostic
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn extraction_failed(&self, _shape: Shape, _preview: &str) {}
}

/// Keeps diagnostics in memory so tests can inspect them
#[derive(Debug, Default)]
pub struct RecordingSink {
    matches: Mutex<Vec<&'static str>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the strategies that produced values, in call order
    pub fn matches(&self) -> Vec<&'static str> {
        self.matches.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Previews recorded for failed extractions, in call order
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingSink {
    fn strategy_matched(&self, strategy: &'static str, _shape: Shape) {
        if let Ok(mut matches) = self.matches.lock() {
            matches.push(strategy);
        }
    }

    fn extraction_failed(&self, _shape: Shape, preview: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(preview.to_string());
        }
    }
}
