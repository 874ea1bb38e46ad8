//! Locating the raw value of a single `"name":value` pair inside a response body

use super::scanner::{find_matching_brace, find_matching_bracket, find_string_end};
use crate::error::FetchError;

/// Returns the quoted form of a field name as it appears in JSON text
pub fn quoted_name(name: &str) -> String {
    serde_json::Value::String(name.to_string()).to_string()
}

/// Extracts the raw text of the value following `"name":` in `body`
///
/// Only the first occurrence of the field is considered. The value is
/// classified by its first non-whitespace character:
/// - `{` returns the balanced object span
/// - `"` returns the string span including both quotes
/// - `[` returns the bracket-balanced array span
/// - anything else returns the trimmed scalar up to the next `,`, `}` or `]`
///
/// Pure function: every failure is reported as `FetchError::NotFound`.
pub fn extract_field<'a>(body: &'a str, name: &str) -> Result<&'a str, FetchError> {
    let not_found = || FetchError::NotFound(name.to_string());
    let bytes = body.as_bytes();

    let key = quoted_name(name);
    let key_start = body.find(&key).ok_or_else(not_found)?;
    let after_key = key_start + key.len();

    let colon = after_key + body[after_key..].find(':').ok_or_else(not_found)?;
    let value_start = (colon + 1..bytes.len())
        .find(|&i| !bytes[i].is_ascii_whitespace())
        .ok_or_else(not_found)?;

    let value_end = match bytes[value_start] {
        b'{' => find_matching_brace(body, value_start),
        b'"' => find_string_end(body, value_start),
        b'[' => find_matching_bracket(body, value_start),
        _ => {
            let end = body[value_start..]
                .find([',', '}', ']'])
                .ok_or_else(not_found)?;
            let scalar = body[value_start..value_start + end].trim();
            if scalar.is_empty() {
                return Err(not_found());
            }
            return Ok(scalar);
        }
    }
    .ok_or_else(not_found)?;

    Ok(&body[value_start..=value_end])
}
