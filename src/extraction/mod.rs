//! Structured data recovery from generative model replies
//!
//! Models are told to "return ONLY the JSON object" but routinely wrap it in
//! prose or code fences, or get the syntax slightly wrong. The extractor
//! treats every reply as untrusted text and runs an ordered list of
//! increasingly permissive strategies; the first one producing a value of
//! the requested [`Shape`] wins. Callers substitute their own fallback value
//! when extraction fails.

pub mod sink;
pub mod strategies;

pub use sink::{DiagnosticSink, NullSink, RecordingSink, TracingSink};
pub use strategies::{
    BracketSpanStrategy, DirectParseStrategy, ExtractionStrategy, FenceStripStrategy,
    FencedBlockStrategy,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Characters of the raw reply kept for failure diagnostics
pub const FAILURE_PREVIEW_CHARS: usize = 200;

/// Top-level type expected from a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    pub fn open(self) -> char {
        match self {
            Shape::Object => '{',
            Shape::Array => '[',
        }
    }

    pub fn close(self) -> char {
        match self {
            Shape::Object => '}',
            Shape::Array => ']',
        }
    }

    /// Whether `value` has this shape at its top level
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Object => f.write_str("JSON object"),
            Shape::Array => f.write_str("JSON array"),
        }
    }
}

/// No strategy produced a value of the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no {shape} found in model reply ({reply_chars} chars)")]
pub struct ExtractionFailure {
    pub shape: Shape,
    /// Head of the raw reply, at most [`FAILURE_PREVIEW_CHARS`] characters
    pub preview: String,
    pub reply_chars: usize,
}

/// Recovers JSON values from model replies
pub struct StructuredReplyExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl StructuredReplyExtractor {
    /// Default strategy chain reporting to `tracing`
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Default strategy chain reporting to `sink`
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            strategies: default_strategies(),
            sink,
        }
    }

    /// Custom strategy chain, tried in the given order
    pub fn with_strategies(
        strategies: Vec<Box<dyn ExtractionStrategy>>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self { strategies, sink }
    }

    /// Names of the configured strategies, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Recover a value of `shape` from `raw_text`
    pub fn extract(&self, raw_text: &str, shape: Shape) -> Result<Value, ExtractionFailure> {
        if !raw_text.trim().is_empty() {
            for strategy in &self.strategies {
                if let Some(value) = strategy.extract(raw_text, shape) {
                    self.sink.strategy_matched(strategy.name(), shape);
                    return Ok(value);
                }
            }
        }

        let preview: String = raw_text.chars().take(FAILURE_PREVIEW_CHARS).collect();
        self.sink.extraction_failed(shape, &preview);

        Err(ExtractionFailure {
            shape,
            preview,
            reply_chars: raw_text.chars().count(),
        })
    }

    /// Recover a JSON object
    pub fn extract_object(&self, raw_text: &str) -> Result<Value, ExtractionFailure> {
        self.extract(raw_text, Shape::Object)
    }

    /// Recover a JSON array
    pub fn extract_array(&self, raw_text: &str) -> Result<Value, ExtractionFailure> {
        self.extract(raw_text, Shape::Array)
    }
}

impl Default for StructuredReplyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StructuredReplyExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredReplyExtractor")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

/// Fast path, `json` fences, any fence, bracket spans, fence stripping
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(DirectParseStrategy),
        Box::new(FencedBlockStrategy::json_tagged()),
        Box::new(FencedBlockStrategy::any()),
        Box::new(BracketSpanStrategy),
        Box::new(FenceStripStrategy),
    ]
}

/// Extract with the default chain and the `tracing` sink
pub fn extract(raw_text: &str, shape: Shape) -> Result<Value, ExtractionFailure> {
    StructuredReplyExtractor::new().extract(raw_text, shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiet() -> StructuredReplyExtractor {
        StructuredReplyExtractor::with_sink(Arc::new(NullSink))
    }

    #[test]
    fn test_minified_object_round_trips() {
        let raw = r#"{"title":"Rust Basics","modules":[{"order":1},{"order":2}],"price":49.5}"#;
        let expected: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(quiet().extract(raw, Shape::Object).unwrap(), expected);
    }

    #[test]
    fn test_fenced_object_with_prose() {
        let raw = "Sure! Here is the result:\n```json\n{\"title\": \"Intro to X\", \"order\": 1}\n```\nLet me know if you need changes.";
        assert_eq!(
            quiet().extract(raw, Shape::Object).unwrap(),
            json!({"title": "Intro to X", "order": 1})
        );
    }

    #[test]
    fn test_plain_prose_fails() {
        let raw = "I'm sorry, I can't produce a course outline for this playlist.";
        let failure = quiet().extract(raw, Shape::Object).unwrap_err();
        assert_eq!(failure.shape, Shape::Object);
        assert_eq!(failure.preview, raw);
    }

    #[test]
    fn test_trailing_comma_fails() {
        assert!(quiet().extract("{\"a\": 1,}", Shape::Object).is_err());
    }

    #[test]
    fn test_truncated_reply_fails() {
        let raw = "```json\n{\"title\": \"Cut off\", \"modules\": [{\"id\": \"module-1\", \"title\": \"Intro";
        assert!(quiet().extract(raw, Shape::Object).is_err());
    }

    #[test]
    fn test_empty_reply_fails() {
        assert!(quiet().extract("   \n", Shape::Array).is_err());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = quiet();
        for raw in [
            "text {\"a\": [1, 2]} text",
            "```\n[1, 2, 3]\n```",
            "nothing to see",
        ] {
            assert_eq!(
                extractor.extract(raw, Shape::Object),
                extractor.extract(raw, Shape::Object)
            );
            assert_eq!(
                extractor.extract(raw, Shape::Array),
                extractor.extract(raw, Shape::Array)
            );
        }
    }

    #[test]
    fn test_shape_discrimination() {
        let raw = "Questions: [\"q1\", \"q2\"]\nCourse: {\"title\": \"Rust\"}";
        let extractor = quiet();
        assert_eq!(
            extractor.extract(raw, Shape::Array).unwrap(),
            json!(["q1", "q2"])
        );
        assert_eq!(
            extractor.extract(raw, Shape::Object).unwrap(),
            json!({"title": "Rust"})
        );
    }

    #[test]
    fn test_scalar_reply_is_not_a_match() {
        assert!(quiet().extract("\"just a string\"", Shape::Object).is_err());
        assert!(quiet().extract("42", Shape::Array).is_err());
    }

    #[test]
    fn test_json_fence_beats_earlier_generic_fence() {
        let raw = "```\n{\"from\": \"generic\"}\n```\nthen\n```json\n{\"from\": \"json\"}\n```";
        assert_eq!(
            quiet().extract(raw, Shape::Object).unwrap(),
            json!({"from": "json"})
        );
    }

    #[test]
    fn test_unclosed_fence_recovered_by_strip() {
        let raw = "```json\n{\"title\": \"No closing fence\"}";
        assert_eq!(
            quiet().extract(raw, Shape::Object).unwrap(),
            json!({"title": "No closing fence"})
        );
    }

    #[test]
    fn test_failure_preview_is_truncated() {
        let raw = "x".repeat(500);
        let failure = quiet().extract(&raw, Shape::Object).unwrap_err();
        assert_eq!(failure.preview.chars().count(), FAILURE_PREVIEW_CHARS);
        assert_eq!(failure.reply_chars, 500);
    }

    #[test]
    fn test_sink_receives_diagnostics() {
        let sink = Arc::new(RecordingSink::new());
        let extractor = StructuredReplyExtractor::with_sink(sink.clone());

        extractor.extract("{\"a\": 1}", Shape::Object).unwrap();
        extractor.extract("see ```json\n[1]\n```", Shape::Array).unwrap();
        extractor.extract("no json here", Shape::Object).unwrap_err();

        assert_eq!(sink.matches(), vec!["direct", "json-fence"]);
        assert_eq!(sink.failures(), vec!["no json here".to_string()]);
    }

    #[test]
    fn test_custom_chain_order() {
        let extractor = StructuredReplyExtractor::with_strategies(
            vec![Box::new(BracketSpanStrategy)],
            Arc::new(NullSink),
        );
        assert_eq!(extractor.strategy_names(), vec!["bracket-span"]);
        // fast path absent, bracket scan still finds the value
        assert_eq!(
            extractor.extract("{\"a\": 1}", Shape::Object).unwrap(),
            json!({"a": 1})
        );
    }

    #[test]
    fn test_default_chain_order() {
        assert_eq!(
            StructuredReplyExtractor::new().strategy_names(),
            vec!["direct", "json-fence", "fence", "bracket-span", "fence-strip"]
        );
    }
}
