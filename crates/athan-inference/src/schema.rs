//! Response schema validation for the model's JSON output.
//!
//! The model is instructed to return one JSON object, optionally fenced in
//! a markdown code block, but nothing guarantees compliance. Parsing and
//! validation are therefore fully defensive: extraction of a fenced block,
//! a distinct invalid-JSON error, and field-by-field validation against a
//! schema built from the live category list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use athan_core::{defaults, Error, ProcessedNote, Result};

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("fenced JSON regex is valid")
});

/// Extract the JSON payload from a model response.
///
/// Prefers the contents of a fenced ```json block when one is present,
/// otherwise returns the raw text.
pub fn extract_json_block(text: &str) -> &str {
    match FENCED_JSON.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    }
}

/// Parse a model response into a JSON value.
///
/// Parse failure is its own distinct error: it is the orchestration's
/// interpretation of a response already obtained, not a request failure,
/// so it is never subject to model fallback.
pub fn parse_response(text: &str) -> Result<Value> {
    let json_text = extract_json_block(text);
    serde_json::from_str(json_text)
        .map_err(|_| Error::Inference("Gemini returned invalid JSON response".to_string()))
}

/// Validation schema for the model's structured note output.
///
/// Built from the current category list as an explicit argument rather
/// than ambient config, so the validation step is trivially testable with
/// fixed inputs.
#[derive(Debug, Clone)]
pub struct NoteSchema {
    categories: Vec<String>,
}

impl NoteSchema {
    /// Build a schema constraining `category` to the given names.
    pub fn new(categories: Vec<String>) -> Self {
        Self { categories }
    }

    /// Validate a parsed response against the schema.
    ///
    /// Collects every violation rather than stopping at the first, so the
    /// surfaced error names each violated field and the reason.
    pub fn validate(&self, value: &Value) -> std::result::Result<ProcessedNote, Vec<String>> {
        let mut issues = Vec::new();

        let title = match value.get("title").and_then(Value::as_str) {
            Some(title) => {
                if title.chars().count() > defaults::SCHEMA_TITLE_MAX {
                    issues.push(format!(
                        "title: Title must be {} characters or less",
                        defaults::SCHEMA_TITLE_MAX
                    ));
                }
                title.to_string()
            }
            None => {
                issues.push("title: Required string".to_string());
                String::new()
            }
        };

        let content = match value.get("content").and_then(Value::as_str) {
            Some(content) => {
                if content.is_empty() {
                    issues.push("content: Content cannot be empty".to_string());
                }
                content.to_string()
            }
            None => {
                issues.push("content: Required string".to_string());
                String::new()
            }
        };

        let summary = match value.get("summary").and_then(Value::as_str) {
            Some(summary) => {
                if summary.is_empty() {
                    issues.push("summary: Summary cannot be empty".to_string());
                } else if summary.chars().count() > defaults::SCHEMA_SUMMARY_MAX {
                    issues.push("summary: Summary too long".to_string());
                }
                summary.to_string()
            }
            None => {
                issues.push("summary: Required string".to_string());
                String::new()
            }
        };

        let category = match value.get("category").and_then(Value::as_str) {
            Some(category) => {
                if !self.categories.iter().any(|c| c == category) {
                    issues.push(format!(
                        "category: Expected one of {}, received \"{}\"",
                        self.categories.join(" | "),
                        category
                    ));
                }
                category.to_string()
            }
            None => {
                issues.push("category: Required string".to_string());
                String::new()
            }
        };

        let tags = match value.get("tags").and_then(Value::as_array) {
            Some(raw_tags) => {
                let mut tags = Vec::with_capacity(raw_tags.len());
                let mut all_strings = true;
                for tag in raw_tags {
                    match tag.as_str() {
                        Some(tag) => tags.push(tag.to_string()),
                        None => all_strings = false,
                    }
                }
                if !all_strings {
                    issues.push("tags: Every tag must be a string".to_string());
                }
                if raw_tags.is_empty() {
                    issues.push("tags: At least one tag is required".to_string());
                } else if raw_tags.len() > defaults::SCHEMA_TAGS_MAX {
                    issues.push(format!(
                        "tags: Maximum {} tags allowed",
                        defaults::SCHEMA_TAGS_MAX
                    ));
                }
                tags
            }
            None => {
                issues.push("tags: Required array of strings".to_string());
                Vec::new()
            }
        };

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(ProcessedNote {
            title,
            content,
            summary,
            category,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> NoteSchema {
        NoteSchema::new(vec![
            "Project".to_string(),
            "Learning".to_string(),
            "Personal".to_string(),
            "Task".to_string(),
        ])
    }

    fn valid_value() -> Value {
        json!({
            "title": "နေ့စဉ်မှတ်စု",
            "content": "ဒီနေ့ အလုပ်မှာ ပရောဂျက်အသစ်စတင်ခဲ့တယ်။",
            "summary": "ပရောဂျက်အသစ် စတင်ခြင်း။",
            "category": "Project",
            "tags": ["work", "project", "planning"]
        })
    }

    #[test]
    fn test_valid_response_passes() {
        let note = schema().validate(&valid_value()).unwrap();
        assert_eq!(note.category, "Project");
        assert_eq!(note.tags.len(), 3);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let mut value = valid_value();
        value["category"] = json!("Diary");
        let issues = schema().validate(&value).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("category:"));
        assert!(issues[0].contains("Diary"));
    }

    #[test]
    fn test_wrong_case_category_is_rejected() {
        let mut value = valid_value();
        value["category"] = json!("personal");
        let issues = schema().validate(&value).unwrap_err();
        assert!(issues[0].starts_with("category:"));
    }

    #[test]
    fn test_oversized_title_is_rejected() {
        let mut value = valid_value();
        value["title"] = json!("က".repeat(101));
        let issues = schema().validate(&value).unwrap_err();
        assert!(issues[0].contains("100 characters or less"));
    }

    #[test]
    fn test_title_at_limit_passes() {
        let mut value = valid_value();
        value["title"] = json!("က".repeat(100));
        assert!(schema().validate(&value).is_ok());
    }

    #[test]
    fn test_empty_content_and_summary_rejected() {
        let mut value = valid_value();
        value["content"] = json!("");
        value["summary"] = json!("");
        let issues = schema().validate(&value).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.starts_with("content:")));
        assert!(issues.iter().any(|i| i.starts_with("summary:")));
    }

    #[test]
    fn test_oversized_summary_rejected() {
        let mut value = valid_value();
        value["summary"] = json!("စ".repeat(201));
        let issues = schema().validate(&value).unwrap_err();
        assert!(issues[0].contains("Summary too long"));
    }

    #[test]
    fn test_empty_tags_rejected() {
        let mut value = valid_value();
        value["tags"] = json!([]);
        let issues = schema().validate(&value).unwrap_err();
        assert!(issues[0].contains("At least one tag"));
    }

    #[test]
    fn test_too_many_tags_rejected() {
        let mut value = valid_value();
        value["tags"] = json!(vec!["t"; 11]);
        let issues = schema().validate(&value).unwrap_err();
        assert!(issues[0].contains("Maximum 10 tags"));
    }

    #[test]
    fn test_missing_fields_all_enumerated() {
        let issues = schema().validate(&json!({})).unwrap_err();
        assert_eq!(issues.len(), 5);
    }

    #[test]
    fn test_extract_json_block_fenced() {
        let text = "Here is the result:\n```json\n{\"title\": \"t\"}\n```\nDone.";
        assert_eq!(extract_json_block(text), "{\"title\": \"t\"}");
    }

    #[test]
    fn test_extract_json_block_fenced_without_language() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_block(text), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_block_raw_text_passthrough() {
        let text = "{\"a\": 1}";
        assert_eq!(extract_json_block(text), text);
    }

    #[test]
    fn test_parse_response_invalid_json_distinct_error() {
        let err = parse_response("I could not process the audio.").unwrap_err();
        assert!(err.to_string().contains("invalid JSON response"));
    }

    #[test]
    fn test_parse_response_fenced_json() {
        let value = parse_response("```json\n{\"title\": \"t\"}\n```").unwrap();
        assert_eq!(value["title"], "t");
    }
}
