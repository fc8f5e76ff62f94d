//! Structured extraction of records from reasoning-service responses.
//!
//! Responses usually wrap JSON in a fenced block, sometimes return bare JSON,
//! and sometimes bury it in prose. [`extract`] tries those shapes in order and
//! never fails: when nothing usable is found it returns the record type's
//! sentinel so callers always get a well-formed, non-empty list.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::LazyLock;

/// Matches ```json ... ``` (or a bare ``` fence) and <json>...</json>.
static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:```(?:json|JSON)?[ \t]*\r?\n?([\s\S]*?)```|<json>\s*([\s\S]*?)</json>)")
        .unwrap()
});

/// A record that can be extracted from a reasoning-service response.
pub trait Record: DeserializeOwned {
    /// JSON Schema every extracted record must satisfy.
    fn schema() -> Value;

    /// Placeholder returned when extraction fails.
    fn extraction_failed() -> Self;
}

/// Outcome of an extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    /// Extracted records, or the single sentinel on failure
    pub records: Vec<T>,
    /// Why extraction failed, if it did
    pub failure: Option<String>,
    /// A free-text `"thought"` found next to the records, if any
    pub note: Option<String>,
}

impl<T> Extraction<T> {
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Extract records from a raw response, substituting the sentinel on failure.
pub fn extract<T: Record>(raw: &str) -> Vec<T> {
    extract_report(raw).records
}

/// Like [`extract`], but also reports whether and why extraction failed.
pub fn extract_report<T: Record>(raw: &str) -> Extraction<T> {
    match try_extract::<T>(raw) {
        Ok((records, note)) => Extraction {
            records,
            failure: None,
            note,
        },
        Err(reason) => Extraction {
            records: vec![T::extraction_failed()],
            failure: Some(reason),
            note: None,
        },
    }
}

fn try_extract<T: Record>(raw: &str) -> Result<(Vec<T>, Option<String>), String> {
    let validator = jsonschema::validator_for(&T::schema())
        .map_err(|e| format!("invalid record schema: {}", e))?;

    let fenced = fenced_blocks(raw);
    let candidates: Vec<Value> = if fenced.is_empty() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("empty response".to_string());
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => vec![value],
            Err(_) => embedded_json(trimmed),
        }
    } else {
        let parsed: Vec<Value> = fenced
            .iter()
            .filter_map(|block| serde_json::from_str::<Value>(block).ok())
            .collect();
        if parsed.is_empty() {
            return Err("fenced block does not contain valid JSON".to_string());
        }
        parsed
    };

    // The first candidate that yields well-formed records wins; otherwise
    // report why the first one was rejected.
    let mut first_error = None;
    for value in candidates {
        let note = value
            .get("thought")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        match record_items(value, &validator).and_then(deserialize_all::<T>) {
            Ok(records) => return Ok((records, note)),
            Err(reason) => {
                first_error.get_or_insert(reason);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| "no JSON found in response".to_string()))
}

fn deserialize_all<T: Record>(items: Vec<Value>) -> Result<Vec<T>, String> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<T>(item)
                .map_err(|e| format!("record {} failed to deserialize: {}", idx, e))
        })
        .collect()
}

/// Interiors of every fenced block, in order of appearance.
fn fenced_blocks(text: &str) -> Vec<String> {
    FENCE_REGEX
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Top-level JSON arrays and objects embedded in prose, in order of
/// appearance. Values nested inside an earlier match are not repeated.
fn embedded_json(text: &str) -> Vec<Value> {
    let mut found = Vec::new();
    let mut resume = 0;
    for (idx, ch) in text.char_indices() {
        if idx < resume || (ch != '{' && ch != '[') {
            continue;
        }
        let mut stream = serde_json::Deserializer::from_str(&text[idx..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next()
            && (value.is_array() || value.is_object())
        {
            resume = idx + stream.byte_offset();
            found.push(value);
        }
    }
    found
}

/// Normalise a parsed value into a list of schema-valid records.
///
/// Accepts a bare array, a single record object, or an object wrapping an
/// array of records under some key. Among wrapped arrays, a non-empty one
/// whose items all validate is preferred over an empty one.
fn record_items(value: Value, validator: &jsonschema::Validator) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => {
            if let Some(idx) = items.iter().position(|item| !validator.is_valid(item)) {
                return Err(format!("record {} does not match the expected shape", idx));
            }
            Ok(items)
        }
        Value::Object(map) => {
            if validator.is_valid(&Value::Object(map.clone())) {
                return Ok(vec![Value::Object(map)]);
            }

            let mut empty = None;
            for (_, v) in map {
                if let Value::Array(items) = v {
                    if items.is_empty() {
                        empty.get_or_insert(items);
                    } else if items.iter().all(|item| validator.is_valid(item)) {
                        return Ok(items);
                    }
                }
            }
            empty.ok_or_else(|| "object holds no list of matching records".to_string())
        }
        other => Err(format!("expected a list of records, found {}", kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Disruption, ResearchFinding, StrategicRecommendation};

    #[test]
    fn test_fenced_json_block() {
        let text = r#"Here are the findings:

```json
[
  {"category": "Technology", "insight": "Agents are moving to production", "impact": "High", "source": "survey"},
  {"category": "Policy", "insight": "AI acts take effect", "impact": "Medium", "source": "gazette"}
]
```

Let me know if you need more."#;

        let findings: Vec<ResearchFinding> = extract(text);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].category, "Technology");
        assert_eq!(findings[1].insight, "AI acts take effect");
    }

    #[test]
    fn test_bare_fence_without_language() {
        let text = "```\n[{\"strategy\": \"Diversify suppliers\", \"priority\": \"High\"}]\n```";
        let strategies: Vec<StrategicRecommendation> = extract(text);
        assert_eq!(strategies.len(), 1);
        assert_eq!(strategies[0].strategy, "Diversify suppliers");
        assert_eq!(strategies[0].rationale, "");
    }

    #[test]
    fn test_json_tag_block() {
        let text = "<json>[{\"strategy\": \"Hedge\", \"priority\": \"Low\"}]</json>";
        let strategies: Vec<StrategicRecommendation> = extract(text);
        assert_eq!(strategies[0].priority, "Low");
    }

    #[test]
    fn test_raw_json_response() {
        let text = r#"[{"type": "Port Strike", "location": "Long Beach", "severity": "High", "description": "10-day delays"}]"#;
        let disruptions: Vec<Disruption> = extract(text);
        assert_eq!(disruptions.len(), 1);
        assert_eq!(disruptions[0].location, "Long Beach");
    }

    #[test]
    fn test_wrapped_list_with_thought() {
        let text = r#"```json
{
  "thought": "Red Sea risk dominates.",
  "disruptions": [
    {"id": 1, "type": "Geopolitical", "location": "Red Sea", "severity": "High", "description": "Security alerts", "source": "news"}
  ]
}
```"#;
        let report = extract_report::<Disruption>(text);
        assert!(!report.failed());
        assert_eq!(report.note.as_deref(), Some("Red Sea risk dominates."));
        assert_eq!(report.records[0].id, "1");
    }

    #[test]
    fn test_single_object_becomes_one_record() {
        let text = r#"{"category": "Economics", "insight": "Rates plateau"}"#;
        let findings: Vec<ResearchFinding> = extract(text);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, "Economics");
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let text = r#"Sure! [see below] The list is [{"category": "Health", "insight": "Trial costs fall"}] as requested."#;
        let findings: Vec<ResearchFinding> = extract(text);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, "Health");
    }

    #[test]
    fn test_unparsable_response_returns_sentinel() {
        let report = extract_report::<ResearchFinding>("I could not find anything useful.");
        assert!(report.failed());
        assert_eq!(report.records, vec![ResearchFinding::extraction_failed()]);
    }

    #[test]
    fn test_broken_fenced_json_returns_sentinel() {
        let text = "```json\n[{\"category\": \"Tech\", \"insight\": ]\n```";
        let findings: Vec<ResearchFinding> = extract(text);
        assert_eq!(findings, vec![ResearchFinding::extraction_failed()]);
    }

    #[test]
    fn test_schema_mismatch_returns_sentinel() {
        let text = r#"[{"category": "Tech"}]"#;
        let report = extract_report::<ResearchFinding>(text);
        assert!(report.failure.unwrap().contains("record 0"));
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn test_scalar_json_returns_sentinel() {
        let strategies: Vec<StrategicRecommendation> = extract("42");
        assert_eq!(strategies, vec![StrategicRecommendation::extraction_failed()]);
    }

    #[test]
    fn test_empty_response_returns_sentinel() {
        let disruptions: Vec<Disruption> = extract("   ");
        assert_eq!(disruptions, vec![Disruption::extraction_failed()]);
    }

    #[test]
    fn test_valid_empty_list_is_empty() {
        let report = extract_report::<Disruption>("```json\n[]\n```");
        assert!(!report.failed());
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_wrapped_empty_list_is_empty() {
        let text = "```json\n{\"thought\": \"No disruptions reported.\", \"disruptions\": []}\n```";
        let report = extract_report::<Disruption>(text);
        assert!(!report.failed());
        assert!(report.records.is_empty());
        assert_eq!(report.note.as_deref(), Some("No disruptions reported."));
    }

    #[test]
    fn test_citation_marker_before_records() {
        let text = r#"Per source [1], the findings are: [{"category": "Health", "insight": "Trial costs fall"}]"#;
        let report = extract_report::<ResearchFinding>(text);
        assert!(!report.failed());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].insight, "Trial costs fall");
    }

    #[test]
    fn test_wrapper_skips_sibling_array_of_other_shape() {
        let text = r#"{"context": [{"note": "background"}], "findings": [{"category": "Health", "insight": "x"}]}"#;
        let report = extract_report::<ResearchFinding>(text);
        assert!(!report.failed());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].category, "Health");
    }

    #[test]
    fn test_wrapper_prefers_records_over_empty_sibling() {
        let text = r#"{"citations": [], "strategies": [{"strategy": "Hedge", "priority": "Low"}]}"#;
        let strategies: Vec<StrategicRecommendation> = extract(text);
        assert_eq!(strategies.len(), 1);
        assert_eq!(strategies[0].strategy, "Hedge");
    }

    #[test]
    fn test_partly_invalid_list_in_prose_is_not_split() {
        let text = r#"Result: [{"category": "Tech"}, {"category": "Health", "insight": "ok"}] done"#;
        let report = extract_report::<ResearchFinding>(text);
        assert!(report.failed());
        assert_eq!(report.records, vec![ResearchFinding::extraction_failed()]);
    }
}
