// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Card schema and validator.
//!
//! The generation service returns a loosely-typed [`RawCard`]. [`validate`]
//! turns it into a [`Card`] or rejects it with a
//! [`SchemaViolation`](crate::error::ErrorKind::SchemaViolation).

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::types::{Card, CardBody};

/// Canonical gap marker the instruction templates ask for.
pub const GAP_MARKER: &str = "_____";

/// Name under which the schema is sent to the service.
pub const SCHEMA_NAME: &str = "vocabulary_card";

/// Allowed number of collocations and of examples.
pub const ITEM_COUNT: RangeInclusive<usize> = 2..=3;

/// A gap marker is any run of three or more underscores, so `___` and
/// `______` both count as one gap.
static GAP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{3,}").expect("gap marker pattern is valid"));

/// The payload as the service returns it, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCard {
    #[serde(alias = "is_exists")]
    pub exists: bool,
    #[serde(default)]
    pub normalized_term: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub collocations: Option<Vec<String>>,
    #[serde(default)]
    pub examples: Option<Vec<String>>,
}

/// JSON schema sent with every request.
///
/// Strict structured-output modes require every property to be listed as
/// required, so the dependent fields are nullable rather than optional.
pub fn card_json_schema() -> serde_json::Value {
    let min_items = *ITEM_COUNT.start();
    let max_items = *ITEM_COUNT.end();
    let examples_description = format!(
        "Example sentences with the word replaced by '{GAP_MARKER}'; null when the word does not exist"
    );
    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["exists", "normalized_term", "definition", "collocations", "examples"],
        "properties": {
            "exists": {
                "type": "boolean",
                "description": "Whether the word or phrase exists in the target language"
            },
            "normalized_term": {
                "type": ["string", "null"],
                "description": "Canonical dictionary form of the word or phrase; null when it does not exist"
            },
            "definition": {
                "type": ["string", "null"],
                "description": "Definition in the target language; null when the word does not exist"
            },
            "collocations": {
                "type": ["array", "null"],
                "items": { "type": "string" },
                "minItems": min_items,
                "maxItems": max_items,
                "description": "Common collocations; null when the word does not exist"
            },
            "examples": {
                "type": ["array", "null"],
                "items": { "type": "string" },
                "minItems": min_items,
                "maxItems": max_items,
                "description": examples_description
            }
        }
    })
}

/// Parses the service's JSON text and validates it.
pub fn parse_card(content: &str) -> Result<Card, ServiceError> {
    let raw: RawCard = serde_json::from_str(content.trim())
        .map_err(|e| ServiceError::schema(format!("response is not a valid card object: {e}")))?;
    validate(raw)
}

/// Checks the card invariants and builds the typed [`Card`].
pub fn validate(raw: RawCard) -> Result<Card, ServiceError> {
    if !raw.exists {
        let populated: Vec<&str> = [
            ("normalized_term", raw.normalized_term.is_some()),
            ("definition", raw.definition.is_some()),
            ("collocations", raw.collocations.is_some()),
            ("examples", raw.examples.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        if !populated.is_empty() {
            return Err(ServiceError::schema(format!(
                "exists is false but {} populated",
                populated.join(", ")
            )));
        }
        return Ok(Card::Missing);
    }

    let normalized_term = required_text("normalized_term", raw.normalized_term)?;
    let definition = required_text("definition", raw.definition)?;
    let collocations = required_list("collocations", raw.collocations)?;
    let examples = required_list("examples", raw.examples)?;

    for (i, example) in examples.iter().enumerate() {
        let gaps = count_gaps(example);
        if gaps != 1 {
            return Err(ServiceError::schema(format!(
                "examples[{i}] must contain exactly one gap marker, found {gaps}"
            )));
        }
    }

    Ok(Card::Found(CardBody {
        normalized_term,
        definition,
        collocations,
        examples,
    }))
}

/// Number of gap markers in `text`.
pub fn count_gaps(text: &str) -> usize {
    GAP_PATTERN.find_iter(text).count()
}

fn required_text(field: &str, value: Option<String>) -> Result<String, ServiceError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(_) => Err(ServiceError::schema(format!("{field} is blank"))),
        None => Err(ServiceError::schema(format!(
            "{field} is missing while exists is true"
        ))),
    }
}

fn required_list(field: &str, value: Option<Vec<String>>) -> Result<Vec<String>, ServiceError> {
    let items = value.ok_or_else(|| {
        ServiceError::schema(format!("{field} is missing while exists is true"))
    })?;

    if !ITEM_COUNT.contains(&items.len()) {
        return Err(ServiceError::schema(format!(
            "{field} must have {}-{} entries, got {}",
            ITEM_COUNT.start(),
            ITEM_COUNT.end(),
            items.len()
        )));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if item.trim().is_empty() {
                Err(ServiceError::schema(format!("{field}[{i}] is blank")))
            } else {
                Ok(item.trim().to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn found_json() -> serde_json::Value {
        serde_json::json!({
            "exists": true,
            "normalized_term": "run",
            "definition": "to move quickly on foot",
            "collocations": ["run a business", "run late"],
            "examples": ["She _____ every morning.", "They _____ out of milk."]
        })
    }

    fn assert_schema_violation(result: Result<Card, ServiceError>, needle: &str) {
        let err = result.expect_err("should be rejected");
        assert_eq!(err.kind, ErrorKind::SchemaViolation);
        assert!(err.message.contains(needle), "got: {}", err.message);
    }

    #[test]
    fn valid_card_parses() {
        let card = parse_card(&found_json().to_string()).unwrap();
        match card {
            Card::Found(body) => {
                assert_eq!(body.normalized_term, "run");
                assert_eq!(body.collocations.len(), 2);
                assert_eq!(body.examples.len(), 2);
            }
            Card::Missing => panic!("expected Found"),
        }
    }

    #[test]
    fn missing_word_parses_with_nulls() {
        let json = r#"{"exists": false, "normalized_term": null, "definition": null,
                       "collocations": null, "examples": null}"#;
        assert_eq!(parse_card(json).unwrap(), Card::Missing);
    }

    #[test]
    fn missing_word_parses_with_absent_fields() {
        assert_eq!(parse_card(r#"{"exists": false}"#).unwrap(), Card::Missing);
    }

    #[test]
    fn legacy_is_exists_field_is_accepted() {
        assert_eq!(parse_card(r#"{"is_exists": false}"#).unwrap(), Card::Missing);
    }

    #[test]
    fn missing_word_with_fields_is_rejected() {
        let json = r#"{"exists": false, "definition": "something"}"#;
        assert_schema_violation(parse_card(json), "definition");
    }

    #[test]
    fn existing_word_without_definition_is_rejected() {
        let mut json = found_json();
        json["definition"] = serde_json::Value::Null;
        assert_schema_violation(parse_card(&json.to_string()), "definition is missing");
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut json = found_json();
        json["normalized_term"] = "   ".into();
        assert_schema_violation(parse_card(&json.to_string()), "normalized_term is blank");

        let mut json = found_json();
        json["collocations"] = serde_json::json!(["run a business", " "]);
        assert_schema_violation(parse_card(&json.to_string()), "collocations[1] is blank");
    }

    #[test]
    fn item_counts_are_bounded() {
        let mut json = found_json();
        json["collocations"] = serde_json::json!(["only one"]);
        assert_schema_violation(parse_card(&json.to_string()), "collocations must have 2-3");

        let mut json = found_json();
        json["examples"] = serde_json::json!([
            "a _____", "b _____", "c _____", "d _____"
        ]);
        assert_schema_violation(parse_card(&json.to_string()), "examples must have 2-3");
    }

    #[test]
    fn three_items_are_allowed() {
        let mut json = found_json();
        json["collocations"] = serde_json::json!(["a", "b", "c"]);
        json["examples"] = serde_json::json!(["a _____", "b _____", "c _____"]);
        assert!(parse_card(&json.to_string()).unwrap().exists());
    }

    #[test]
    fn examples_need_exactly_one_gap() {
        let mut json = found_json();
        json["examples"] = serde_json::json!(["no gap here", "She _____ fast."]);
        assert_schema_violation(parse_card(&json.to_string()), "found 0");

        let mut json = found_json();
        json["examples"] = serde_json::json!(["_____ and _____", "She _____ fast."]);
        assert_schema_violation(parse_card(&json.to_string()), "found 2");
    }

    #[test]
    fn gap_marker_length_is_flexible() {
        assert_eq!(count_gaps("She ___ fast."), 1);
        assert_eq!(count_gaps("She ________ fast."), 1);
        assert_eq!(count_gaps("snake_case is not a gap"), 0);
    }

    #[test]
    fn malformed_json_is_schema_violation() {
        assert_schema_violation(parse_card("not json"), "not a valid card object");
    }

    #[test]
    fn schema_lists_all_fields_as_required() {
        let schema = card_json_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 5);
        assert_eq!(schema["properties"]["examples"]["maxItems"], 3);
    }
}
