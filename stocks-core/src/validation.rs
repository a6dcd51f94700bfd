//! Boundary checks for caller-supplied plot records.
//!
//! Records arrive as raw JSON so that a bad record can be reported by index and
//! field instead of failing the whole payload with a generic decode error.
//! Checks run in input order and stop at the first violation.

use crate::error::ValidationError;
use crate::types::{PostLink, SentimentPoint};
use serde_json::{Map, Value};
use url::Url;

pub const SENTIMENT_RANGE: (f64, f64) = (-1.0, 1.0);
pub const PRESENCE_RANGE: (f64, f64) = (0.0, 1.0);
pub const MAX_SUMMARY_CHARS: usize = 2000;
pub const MAX_LINK_TITLE_CHARS: usize = 200;

const SYMBOL: (&str, &str) = ("Symbol", "symbol");
const SENTIMENT: (&str, &str) = ("Sentiment", "sentiment");
const PRESENCE: (&str, &str) = ("Presence", "presence");
const SUMMARY: (&str, &str) = ("Summary", "summary");
const LINKS: (&str, &str) = ("Links", "links");

/// Validates every record and converts them into [`SentimentPoint`]s.
///
/// Unknown keys are ignored. Out-of-range values are rejected, never clamped.
pub fn validate_points(records: &[Value]) -> Result<Vec<SentimentPoint>, ValidationError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| validate_point(index, record))
        .collect()
}

pub fn validate_point(index: usize, record: &Value) -> Result<SentimentPoint, ValidationError> {
    let object = record
        .as_object()
        .ok_or(ValidationError::NotAnObject { index })?;

    let symbol = required_symbol(index, object)?;
    let sentiment = required_number(index, object, SENTIMENT, SENTIMENT_RANGE)?;
    let presence = required_number(index, object, PRESENCE, PRESENCE_RANGE)?;
    let summary = optional_summary(index, object)?;
    let links = optional_links(index, object)?;

    Ok(SentimentPoint {
        symbol,
        sentiment,
        presence,
        summary,
        links,
    })
}

fn lookup<'a>(object: &'a Map<String, Value>, (name, alias): (&str, &str)) -> Option<&'a Value> {
    object
        .get(name)
        .or_else(|| object.get(alias))
        .filter(|value| !value.is_null())
}

fn required_symbol(index: usize, object: &Map<String, Value>) -> Result<String, ValidationError> {
    let value = lookup(object, SYMBOL).ok_or_else(|| ValidationError::MissingField {
        index,
        field: SYMBOL.0.to_string(),
    })?;
    let symbol = value.as_str().ok_or_else(|| ValidationError::WrongType {
        index,
        field: SYMBOL.0.to_string(),
        expected: "a string",
    })?;
    if symbol.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            index,
            field: SYMBOL.0.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(symbol.to_string())
}

fn required_number(
    index: usize,
    object: &Map<String, Value>,
    key: (&str, &str),
    (min, max): (f64, f64),
) -> Result<f64, ValidationError> {
    let value = lookup(object, key).ok_or_else(|| ValidationError::MissingField {
        index,
        field: key.0.to_string(),
    })?;
    let number = value.as_f64().ok_or_else(|| ValidationError::WrongType {
        index,
        field: key.0.to_string(),
        expected: "a number",
    })?;
    if !(min..=max).contains(&number) {
        return Err(ValidationError::OutOfRange {
            index,
            field: key.0.to_string(),
            value: number,
            min,
            max,
        });
    }
    Ok(number)
}

fn optional_summary(
    index: usize,
    object: &Map<String, Value>,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = lookup(object, SUMMARY) else {
        return Ok(None);
    };
    let summary = value.as_str().ok_or_else(|| ValidationError::WrongType {
        index,
        field: SUMMARY.0.to_string(),
        expected: "a string",
    })?;
    if summary.chars().count() > MAX_SUMMARY_CHARS {
        return Err(ValidationError::InvalidValue {
            index,
            field: SUMMARY.0.to_string(),
            reason: format!("must be at most {MAX_SUMMARY_CHARS} characters"),
        });
    }
    Ok(Some(summary.to_string()))
}

fn optional_links(
    index: usize,
    object: &Map<String, Value>,
) -> Result<Vec<PostLink>, ValidationError> {
    let Some(value) = lookup(object, LINKS) else {
        return Ok(Vec::new());
    };
    let entries = value.as_array().ok_or_else(|| ValidationError::WrongType {
        index,
        field: LINKS.0.to_string(),
        expected: "an array of {url, title} objects",
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| validate_link(index, position, entry))
        .collect()
}

fn validate_link(index: usize, position: usize, entry: &Value) -> Result<PostLink, ValidationError> {
    let field = |name: &str| format!("{}[{position}].{name}", LINKS.0);

    let object = entry.as_object().ok_or_else(|| ValidationError::WrongType {
        index,
        field: format!("{}[{position}]", LINKS.0),
        expected: "an object with 'url' and 'title'",
    })?;

    let url = object
        .get("url")
        .ok_or_else(|| ValidationError::MissingField {
            index,
            field: field("url"),
        })?
        .as_str()
        .ok_or_else(|| ValidationError::WrongType {
            index,
            field: field("url"),
            expected: "a string",
        })?;
    let parsed = Url::parse(url).map_err(|err| ValidationError::InvalidValue {
        index,
        field: field("url"),
        reason: format!("is not a valid URL ({err})"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ValidationError::InvalidValue {
            index,
            field: field("url"),
            reason: "must be an absolute http(s) URL".to_string(),
        });
    }

    let title = object
        .get("title")
        .ok_or_else(|| ValidationError::MissingField {
            index,
            field: field("title"),
        })?
        .as_str()
        .ok_or_else(|| ValidationError::WrongType {
            index,
            field: field("title"),
            expected: "a string",
        })?;
    let title_len = title.chars().count();
    if title_len == 0 || title_len > MAX_LINK_TITLE_CHARS {
        return Err(ValidationError::InvalidValue {
            index,
            field: field("title"),
            reason: format!("must be 1 to {MAX_LINK_TITLE_CHARS} characters"),
        });
    }

    Ok(PostLink {
        url: url.to_string(),
        title: title.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_minimal_record() {
        let records = vec![json!({"Symbol": "Apple Inc. (AAPL)", "Sentiment": 0.75, "Presence": 0.85})];
        let points = validate_points(&records).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].symbol, "Apple Inc. (AAPL)");
        assert_eq!(points[0].sentiment, 0.75);
        assert_eq!(points[0].presence, 0.85);
        assert!(points[0].summary.is_none());
        assert!(points[0].links.is_empty());
    }

    #[test]
    fn test_rejects_sentiment_above_range() {
        let records = vec![json!({"Symbol": "X", "Sentiment": 1.5, "Presence": 0.5})];
        let err = validate_points(&records).unwrap_err();
        assert_eq!(err.index(), Some(0));
        assert_eq!(err.field(), Some("Sentiment"));
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_reports_first_offending_record() {
        let records = vec![
            json!({"Symbol": "A (A)", "Sentiment": 0.1, "Presence": 0.2}),
            json!({"Symbol": "B (B)", "Sentiment": 0.1, "Presence": 1.2}),
            json!({"Symbol": "C (C)", "Sentiment": -3.0, "Presence": 0.2}),
        ];
        let err = validate_points(&records).unwrap_err();
        assert_eq!(err.index(), Some(1));
        assert_eq!(err.field(), Some("Presence"));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let records = vec![
            json!({"Symbol": "Low", "Sentiment": -1.0, "Presence": 0.0}),
            json!({"Symbol": "High", "Sentiment": 1, "Presence": 1}),
        ];
        let points = validate_points(&records).unwrap();
        assert_eq!(points[1].sentiment, 1.0);
        assert_eq!(points[1].presence, 1.0);
    }

    #[test]
    fn test_negative_presence_rejected() {
        let records = vec![json!({"Symbol": "X", "Sentiment": 0.0, "Presence": -0.01})];
        let err = validate_points(&records).unwrap_err();
        assert_eq!(err.field(), Some("Presence"));
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let missing = vec![json!({"Symbol": "X", "Presence": 0.5})];
        let err = validate_points(&missing).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { index: 0, ref field } if field == "Sentiment"));

        let mistyped = vec![json!({"Symbol": "X", "Sentiment": "0.5", "Presence": 0.5})];
        let err = validate_points(&mistyped).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { index: 0, ref field, .. } if field == "Sentiment"));

        let null_symbol = vec![json!({"Symbol": null, "Sentiment": 0.5, "Presence": 0.5})];
        let err = validate_points(&null_symbol).unwrap_err();
        assert_eq!(err.field(), Some("Symbol"));

        let blank_symbol = vec![json!({"Symbol": "  ", "Sentiment": 0.5, "Presence": 0.5})];
        let err = validate_points(&blank_symbol).unwrap_err();
        assert_eq!(err.field(), Some("Symbol"));
    }

    #[test]
    fn test_non_object_record() {
        let records = vec![json!(["X", 0.1, 0.2])];
        let err = validate_points(&records).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject { index: 0 });
        assert_eq!(err.index(), Some(0));
        assert_eq!(err.field(), Some("record"));
    }

    #[test]
    fn test_lowercase_keys_and_extra_keys() {
        let records = vec![json!({
            "symbol": "Tesla Inc. (TSLA)",
            "sentiment": -0.4,
            "presence": 0.3,
            "colour": "red"
        })];
        let points = validate_points(&records).unwrap();
        assert_eq!(points[0].symbol, "Tesla Inc. (TSLA)");
        assert_eq!(points[0].sentiment, -0.4);
    }

    #[test]
    fn test_summary_and_links() {
        let records = vec![json!({
            "Symbol": "NVIDIA Corp. (NVDA)",
            "Sentiment": 0.6,
            "Presence": 0.7,
            "Summary": "Earnings beat, strong guidance.",
            "Links": [{"url": "https://www.reddit.com/r/stocks/comments/abc123/nvda/", "title": "NVDA earnings"}]
        })];
        let points = validate_points(&records).unwrap();
        assert_eq!(points[0].summary.as_deref(), Some("Earnings beat, strong guidance."));
        assert_eq!(points[0].links.len(), 1);
        assert_eq!(points[0].links[0].title, "NVDA earnings");
    }

    #[test]
    fn test_bad_link_reports_nested_field() {
        let records = vec![json!({
            "Symbol": "X",
            "Sentiment": 0.0,
            "Presence": 0.1,
            "Links": [
                {"url": "https://redd.it/abc", "title": "ok"},
                {"url": "ftp://example.com/file", "title": "bad scheme"}
            ]
        })];
        let err = validate_points(&records).unwrap_err();
        assert_eq!(err.field(), Some("Links[1].url"));

        let long_summary = vec![json!({
            "Symbol": "X",
            "Sentiment": 0.0,
            "Presence": 0.1,
            "Summary": "a".repeat(MAX_SUMMARY_CHARS + 1)
        })];
        let err = validate_points(&long_summary).unwrap_err();
        assert_eq!(err.field(), Some("Summary"));
    }

    #[test]
    fn test_empty_input_is_valid() {
        assert!(validate_points(&[]).unwrap().is_empty());
    }
}
