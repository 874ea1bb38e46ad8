//! Resilient extraction of structured account data from semi-structured responses
//!
//! Responses may be HTML, JSON, or server-rendered pages with JSON fragments
//! embedded in scripts. Instead of parsing the whole document, the extractor
//! locates each required field's value span (balanced braces/brackets, quoted
//! strings with escape parity, bare scalars) and parses only those fragments.

mod assembler;
mod field;
mod scanner;
mod strategy;

pub use assembler::assemble_record;
pub use field::extract_field;
pub use scanner::{find_matching_brace, find_matching_bracket, find_string_end};
pub use strategy::{apply_first, Strategy};

/// A structured record extracted from a response
pub type Record = serde_json::Map<String, serde_json::Value>;
