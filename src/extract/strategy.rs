//! Named extraction strategies, tried in priority order
//!
//! Each strategy declares the shape it expects. New upstream shapes are added
//! as new entries (in code or in the config file), never by touching the
//! scanner.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::assembler::assemble_record;
use super::field::quoted_name;
use super::Record;
use crate::error::FetchError;

/// One way of turning a response body into a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// The record is spread over sibling fields
    Fields { name: String, fields: Vec<String> },
    /// A single field holds the whole record as an object
    Embedded { name: String, field: String },
    /// The whole body is a JSON document
    Document {
        name: String,
        /// Key to wrap a non-object document under (e.g. a top-level array)
        #[serde(default)]
        wrap_as: Option<String>,
    },
}

impl Strategy {
    /// Convenience constructor for a `Fields` strategy
    pub fn fields(name: &str, fields: &[&str]) -> Self {
        Strategy::Fields {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Convenience constructor for an `Embedded` strategy
    pub fn embedded(name: &str, field: &str) -> Self {
        Strategy::Embedded {
            name: name.to_string(),
            field: field.to_string(),
        }
    }

    /// Convenience constructor for a `Document` strategy
    pub fn document(name: &str, wrap_as: Option<&str>) -> Self {
        Strategy::Document {
            name: name.to_string(),
            wrap_as: wrap_as.map(str::to_string),
        }
    }

    /// The strategy's name, used in logs
    pub fn name(&self) -> &str {
        match self {
            Strategy::Fields { name, .. }
            | Strategy::Embedded { name, .. }
            | Strategy::Document { name, .. } => name,
        }
    }

    /// Runs the strategy against a response body
    pub fn apply(&self, body: &str) -> Result<Record, FetchError> {
        match self {
            Strategy::Fields { fields, .. } => {
                let view = locate_view(body, fields)?;
                assemble_record(&view, fields)
            }
            Strategy::Embedded { field, .. } => {
                let fields = std::slice::from_ref(field);
                let view = locate_view(body, fields)?;
                let mut record = assemble_record(&view, fields)?;
                match record.remove(field) {
                    Some(Value::Object(inner)) => Ok(inner),
                    _ => Err(FetchError::malformed(format!(
                        "field `{}` does not hold an object",
                        field
                    ))),
                }
            }
            Strategy::Document { wrap_as, .. } => {
                let value: Value = serde_json::from_str(body.trim())?;
                match (value, wrap_as) {
                    (Value::Object(record), _) => Ok(record),
                    (other, Some(key)) => {
                        let mut record = Record::new();
                        record.insert(key.clone(), other);
                        Ok(record)
                    }
                    (_, None) => Err(FetchError::malformed("document is not an object")),
                }
            }
        }
    }
}

/// Tries each strategy in order and returns the first record produced
///
/// # Returns
/// * `Ok((name, record))` from the first strategy that succeeds
/// * `Err` from the last strategy tried, or `NotFound` if `strategies` is empty
pub fn apply_first<'s>(
    strategies: &'s [Strategy],
    body: &str,
) -> Result<(&'s str, Record), FetchError> {
    let mut last_error = FetchError::NotFound("no extraction strategy configured".to_string());

    for strategy in strategies {
        match strategy.apply(body) {
            Ok(record) => return Ok((strategy.name(), record)),
            Err(e) => {
                debug!(strategy = strategy.name(), error = %e, "extraction strategy did not match");
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Picks the view of `body` in which every field name is present
///
/// Dashboards often ship the record as an escaped JSON string inside a script
/// (`initialData\":{\"current\":...}`), so when the plain body lacks a field the
/// one-level unescaped body is checked too.
fn locate_view<'a>(body: &'a str, fields: &[String]) -> Result<Cow<'a, str>, FetchError> {
    let missing = |text: &str| {
        fields
            .iter()
            .find(|f| !text.contains(&quoted_name(f)))
            .cloned()
    };

    let Some(first_missing) = missing(body) else {
        return Ok(Cow::Borrowed(body));
    };

    if !body.contains("\\\"") {
        return Err(FetchError::NotFound(first_missing));
    }

    let unescaped = unescape_once(body);
    match missing(&unescaped) {
        None => Ok(Cow::Owned(unescaped)),
        Some(field) => Err(FetchError::NotFound(field)),
    }
}

/// Removes one level of JSON string escaping for quotes and backslashes
fn unescape_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ESCAPED_DASHBOARD: &str = r#"<script>self.__next_f.push([1,"5:[\"$\",\"div\",null,{\"initialData\":{\"current\":\"256\",\"max\":\"8000\",\"plan\":\"PRO\",\"lastRecoveryTimeRelative\":\"2 分钟前\",\"canResetToday\":false,\"dailyUsageInfo\":null}}]"])</script>"#;

    #[test]
    fn test_fields_strategy() {
        let body = r#"<html>{"userPlan":"MAX","creditData":{"current":1},"weeklyUsageData":{"weeklyUsed":5,"weeklyLimit":10}}</html>"#;
        let strategy = Strategy::fields("v3", &["userPlan", "creditData", "weeklyUsageData"]);
        let record = strategy.apply(body).unwrap();
        assert_eq!(record["userPlan"], json!("MAX"));
        assert_eq!(record["weeklyUsageData"]["weeklyLimit"], json!(10));
    }

    #[test]
    fn test_embedded_strategy_unescapes_script_payload() {
        let strategy = Strategy::embedded("initial-data", "initialData");
        let record = strategy.apply(ESCAPED_DASHBOARD).unwrap();
        assert_eq!(record["current"], json!("256"));
        assert_eq!(record["plan"], json!("PRO"));
        assert_eq!(record["canResetToday"], json!(false));
        assert_eq!(record["lastRecoveryTimeRelative"], json!("2 分钟前"));
    }

    #[test]
    fn test_embedded_requires_object() {
        let strategy = Strategy::embedded("initial-data", "initialData");
        let result = strategy.apply(r#"{"initialData":42}"#);
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_document_object() {
        let strategy = Strategy::document("api", None);
        let record = strategy.apply(" {\"credits\": 900}\n").unwrap();
        assert_eq!(record["credits"], json!(900));
    }

    #[test]
    fn test_document_array_wrapped() {
        let strategy = Strategy::document("usage", Some("records"));
        let record = strategy.apply(r#"[{"apiKeyLabel":"a","creditsUsed":3}]"#).unwrap();
        assert_eq!(record["records"][0]["creditsUsed"], json!(3));
    }

    #[test]
    fn test_document_array_without_wrap_is_malformed() {
        let strategy = Strategy::document("api", None);
        assert!(matches!(strategy.apply("[1,2]"), Err(FetchError::Malformed(_))));
        assert!(matches!(strategy.apply("<html>"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_apply_first_uses_priority_order() {
        let body = r#"{"plan":"PRO","creditData":{"current":2},"usageData":{"used":1,"limit":3}}"#;
        let strategies = vec![
            Strategy::fields("v3", &["userPlan", "creditData", "weeklyUsageData"]),
            Strategy::fields("v2", &["plan", "creditData", "usageData"]),
            Strategy::fields("credit-only", &["creditData"]),
        ];

        let (name, record) = apply_first(&strategies, body).unwrap();
        assert_eq!(name, "v2");
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_apply_first_reports_last_error() {
        let strategies = vec![Strategy::fields("v2", &["plan", "creditData"])];
        let result = apply_first(&strategies, r#"{"plan":"PRO"}"#);
        assert!(matches!(result, Err(FetchError::NotFound(name)) if name == "creditData"));
    }

    #[test]
    fn test_apply_first_with_no_strategies() {
        assert!(matches!(apply_first(&[], "{}"), Err(FetchError::NotFound(_))));
    }

    #[test]
    fn test_strategy_deserializes_from_config() {
        let raw = json!([
            {"kind": "fields", "name": "v2", "fields": ["plan", "creditData"]},
            {"kind": "embedded", "name": "legacy", "field": "initialData"},
            {"kind": "document", "name": "api"}
        ]);
        let strategies: Vec<Strategy> = serde_json::from_value(raw).unwrap();
        assert_eq!(strategies[0], Strategy::fields("v2", &["plan", "creditData"]));
        assert_eq!(strategies[1], Strategy::embedded("legacy", "initialData"));
        assert_eq!(strategies[2], Strategy::document("api", None));
    }

    #[test]
    fn test_unescape_once() {
        assert_eq!(unescape_once(r#"{\"a\":\"x\\\"y\"}"#), r#"{"a":"x\"y"}"#);
        assert_eq!(unescape_once(r"tab\t stays"), r"tab\t stays");
    }
}
