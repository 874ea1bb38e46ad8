//! Assembling one record from independently located field fragments

use super::field::{extract_field, quoted_name};
use super::Record;
use crate::error::FetchError;

/// Extracts every field in `fields` and parses them together as one object
///
/// The fragments are spliced into a synthetic literal
/// `{"f1":<fragment>,"f2":<fragment>}` which is parsed as a unit, so whatever
/// surrounds the fields in `body` (markup, scripts, other keys) is ignored.
///
/// # Returns
/// * `Ok(Record)` holding exactly the requested fields
/// * `Err(FetchError::NotFound)` if any field is missing, without a partial record
/// * `Err(FetchError::Malformed)` if the spliced literal does not parse
pub fn assemble_record(body: &str, fields: &[String]) -> Result<Record, FetchError> {
    let fragments = fields
        .iter()
        .map(|name| extract_field(body, name).map(|fragment| (name, fragment)))
        .collect::<Result<Vec<_>, _>>()?;

    let literal = fragments
        .iter()
        .map(|(name, fragment)| format!("{}:{}", quoted_name(name), fragment))
        .collect::<Vec<_>>()
        .join(",");

    let record: Record = serde_json::from_str(&format!("{{{}}}", literal))?;
    Ok(record)
}
