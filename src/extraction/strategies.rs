//! Ordered recovery strategies used by [`StructuredReplyExtractor`].
//!
//! [`StructuredReplyExtractor`]: super::StructuredReplyExtractor

use super::Shape;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// One way of recovering a JSON value from free-form model text
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Returns the first value of `shape` this strategy can find
    fn extract(&self, text: &str, shape: Shape) -> Option<Value>;
}

/// Parse `candidate` and keep it only when its top-level type is `shape`
fn parse_shaped(candidate: &str, shape: Shape) -> Option<Value> {
    serde_json::from_str::<Value>(candidate.trim())
        .ok()
        .filter(|value| shape.matches(value))
}

/// Matches a fenced block, capturing the language tag and the body
fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*([A-Za-z0-9_+.-]*)[ \t]*\r?\n?(.*?)```")
            .expect("fence pattern is valid")
    })
}

/// Matches the fence markers removed by [`FenceStripStrategy`]
fn fence_marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?i)```(?:json)?").expect("fence marker pattern is valid"))
}

/// Whole reply is already the value, e.g. `{"title": "..."}`
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectParseStrategy;

impl ExtractionStrategy for DirectParseStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn extract(&self, text: &str, shape: Shape) -> Option<Value> {
        let trimmed = text.trim();
        if trimmed.starts_with(shape.open()) && trimmed.ends_with(shape.close()) {
            parse_shaped(trimmed, shape)
        } else {
            None
        }
    }
}

/// Fenced code blocks, optionally restricted to blocks tagged `json`
#[derive(Debug, Clone, Copy)]
pub struct FencedBlockStrategy {
    json_only: bool,
}

impl FencedBlockStrategy {
    /// Only blocks opened with ```` ```json ````
    pub fn json_tagged() -> Self {
        Self { json_only: true }
    }

    /// Any fenced block, whatever its tag
    pub fn any() -> Self {
        Self { json_only: false }
    }
}

impl ExtractionStrategy for FencedBlockStrategy {
    fn name(&self) -> &'static str {
        if self.json_only {
            "json-fence"
        } else {
            "fence"
        }
    }

    fn extract(&self, text: &str, shape: Shape) -> Option<Value> {
        fence_regex()
            .captures_iter(text)
            .filter(|caps| {
                !self.json_only
                    || caps
                        .get(1)
                        .map_or(false, |tag| tag.as_str().eq_ignore_ascii_case("json"))
            })
            .filter_map(|caps| caps.get(2))
            .find_map(|body| parse_shaped(body.as_str(), shape))
    }
}

/// Bracket spans found anywhere in the reply.
///
/// Balanced spans are tried in order of appearance. A span that parses to
/// the other shape is skipped as a whole so values nested inside it are not
/// picked up. A span that never closes means the reply was cut off: the
/// balanced scan stops there rather than returning a value nested inside the
/// unfinished one. The greedy span from the first opening bracket to the last
/// closing bracket is the final candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BracketSpanStrategy;

impl BracketSpanStrategy {
    fn balanced(text: &str, shape: Shape) -> Option<Value> {
        let mut pos = 0;
        while let Some(offset) = text[pos..].find(['{', '[']) {
            let start = pos + offset;
            match balanced_end(text, start) {
                SpanEnd::Closed(end) => match serde_json::from_str::<Value>(&text[start..=end]) {
                    Ok(value) if shape.matches(&value) => return Some(value),
                    Ok(_) => {
                        pos = end + 1;
                        continue;
                    }
                    Err(_) => {}
                },
                SpanEnd::Mismatched => {}
                SpanEnd::Unterminated => return None,
            }
            pos = start + 1;
        }
        None
    }

    fn greedy(text: &str, shape: Shape) -> Option<Value> {
        let start = text.find(shape.open())?;
        let end = text.rfind(shape.close())?;
        if end <= start {
            return None;
        }
        parse_shaped(&text[start..=end], shape)
    }
}

impl ExtractionStrategy for BracketSpanStrategy {
    fn name(&self) -> &'static str {
        "bracket-span"
    }

    fn extract(&self, text: &str, shape: Shape) -> Option<Value> {
        Self::balanced(text, shape).or_else(|| Self::greedy(text, shape))
    }
}

/// Where the span opened at a given bracket ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanEnd {
    /// Byte index of the matching closer
    Closed(usize),
    /// A closer of the wrong kind was found first
    Mismatched,
    /// The text ended with the span still open
    Unterminated,
}

/// Find the bracket closing the one at `start`.
///
/// Brackets inside JSON strings are ignored.
fn balanced_end(text: &str, start: usize) -> SpanEnd {
    let mut expected: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => expected.push('}'),
            '[' => expected.push(']'),
            '}' | ']' => {
                if expected.pop() != Some(ch) {
                    return SpanEnd::Mismatched;
                }
                if expected.is_empty() {
                    return SpanEnd::Closed(start + idx);
                }
            }
            _ => {}
        }
    }

    SpanEnd::Unterminated
}

/// Last resort: drop every fence marker and parse what remains
#[derive(Debug, Default, Clone, Copy)]
pub struct FenceStripStrategy;

impl ExtractionStrategy for FenceStripStrategy {
    fn name(&self) -> &'static str {
        "fence-strip"
    }

    fn extract(&self, text: &str, shape: Shape) -> Option<Value> {
        let cleaned = fence_marker_regex().replace_all(text, "");
        parse_shaped(&cleaned, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_requires_matching_brackets() {
        let strategy = DirectParseStrategy;
        assert_eq!(
            strategy.extract("  {\"a\": 1}\n", Shape::Object),
            Some(json!({"a": 1}))
        );
        assert_eq!(strategy.extract("[1, 2]", Shape::Object), None);
        assert_eq!(strategy.extract("note: {\"a\": 1}", Shape::Object), None);
    }

    #[test]
    fn test_json_fence_ignores_other_tags() {
        let text = "```python\n{\"lang\": \"py\"}\n```\n```json\n{\"lang\": \"json\"}\n```";
        assert_eq!(
            FencedBlockStrategy::json_tagged().extract(text, Shape::Object),
            Some(json!({"lang": "json"}))
        );
        assert_eq!(
            FencedBlockStrategy::any().extract(text, Shape::Object),
            Some(json!({"lang": "py"}))
        );
    }

    #[test]
    fn test_fence_without_newline_or_tag() {
        let text = "```{\"a\": [1, 2]}```";
        assert_eq!(
            FencedBlockStrategy::any().extract(text, Shape::Object),
            Some(json!({"a": [1, 2]}))
        );
    }

    #[test]
    fn test_fence_body_of_wrong_shape_is_skipped() {
        let text = "```json\n[1, 2]\n```\n```json\n{\"ok\": true}\n```";
        assert_eq!(
            FencedBlockStrategy::json_tagged().extract(text, Shape::Object),
            Some(json!({"ok": true}))
        );
    }

    #[test]
    fn test_balanced_end_ignores_brackets_in_strings() {
        let text = r#"x {"a": "}{", "b": [1, {"c": "]"}]} y"#;
        let start = text.find('{').unwrap();
        let SpanEnd::Closed(end) = balanced_end(text, start) else {
            panic!("span should close");
        };
        assert_eq!(&text[start..=end], r#"{"a": "}{", "b": [1, {"c": "]"}]}"#);
    }

    #[test]
    fn test_balanced_end_handles_escaped_quotes() {
        let text = r#"{"quote": "say \"}\" now"}"#;
        assert_eq!(balanced_end(text, 0), SpanEnd::Closed(text.len() - 1));
    }

    #[test]
    fn test_balanced_end_tells_mismatch_from_truncation() {
        assert_eq!(balanced_end("{\"a\": [1}", 0), SpanEnd::Mismatched);
        assert_eq!(balanced_end("{\"a\": {\"b\": 1}", 0), SpanEnd::Unterminated);
        assert_eq!(balanced_end("{\"a\": \"}", 0), SpanEnd::Unterminated);
    }

    #[test]
    fn test_bracket_span_skips_other_shape_as_a_whole() {
        let text = "first [{\"inner\": 1}] then {\"outer\": 2}";
        assert_eq!(
            BracketSpanStrategy.extract(text, Shape::Object),
            Some(json!({"outer": 2}))
        );
        assert_eq!(
            BracketSpanStrategy.extract(text, Shape::Array),
            Some(json!([{"inner": 1}]))
        );
    }

    #[test]
    fn test_bracket_span_descends_into_closed_invalid_span() {
        // the outer span closes but is invalid JSON, the nested one is not
        let text = "{ broken: {\"fine\": true} }";
        assert_eq!(
            BracketSpanStrategy.extract(text, Shape::Object),
            Some(json!({"fine": true}))
        );
    }

    #[test]
    fn test_bracket_span_does_not_descend_into_truncated_value() {
        let text = "{\"title\": \"Full Course\", \"modules\": [{\"id\": \"module-1\", \"title\": \"Basics\"}, {\"id\": \"module-2\", \"title\": \"Adv";
        assert_eq!(BracketSpanStrategy.extract(text, Shape::Object), None);
        assert_eq!(BracketSpanStrategy.extract(text, Shape::Array), None);
    }

    #[test]
    fn test_bracket_span_on_long_unclosed_input() {
        let started = std::time::Instant::now();
        let text = "[".repeat(20_000);
        assert_eq!(BracketSpanStrategy.extract(&text, Shape::Object), None);
        assert_eq!(BracketSpanStrategy.extract(&text, Shape::Array), None);
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_bracket_span_prefers_first_match() {
        let text = "{\"n\": 1} and later {\"n\": 2, \"more\": [1, 2, 3]}";
        assert_eq!(
            BracketSpanStrategy.extract(text, Shape::Object),
            Some(json!({"n": 1}))
        );
    }

    #[test]
    fn test_fence_strip_removes_markers() {
        let text = "```json\n{\"a\": 1}";
        assert_eq!(
            FenceStripStrategy.extract(text, Shape::Object),
            Some(json!({"a": 1}))
        );
        assert_eq!(FenceStripStrategy.extract("```JSON\n\"str\"\n```", Shape::Object), None);
    }
}
