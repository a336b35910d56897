//! Front matter detection and extraction.
//!
//! A metadata block sits at the top of a content file between two delimiter
//! lines. A line counts as a delimiter if it equals `---` once tab
//! characters are stripped, so delimiters inside indented blocks are still
//! recognized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The front matter delimiter.
pub const DELIMITER: &str = "---";

#[derive(thiserror::Error, Debug)]
pub enum MatterError {
    #[error("no metadata block at the start of the file")]
    MetadataAbsent,
}

/// A single front matter value.
///
/// YAML dates are not given their own variant; they travel as strings and
/// are parsed against the fixed date layout during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into the JSON value currency used by render contexts.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

/// Ordered front matter fields for one content unit.
pub type Fields = BTreeMap<String, FieldValue>;

/// Returns true if the text carries a metadata block.
///
/// Detection succeeds only when exactly two delimiter lines occur; one too
/// few or one too many both count as "no metadata", never an error.
pub fn detect(text: &str) -> bool {
    let count = text
        .lines()
        .filter(|line| line.replace('\t', "") == DELIMITER)
        .count();

    count == 2
}

/// Slice a text into its metadata and body parts.
///
/// Byte-exact: `--- + metadata + --- + body` reproduces the input. Only
/// valid on text for which [`detect`] returned true; text that does not
/// begin with a delimiter fails with [`MatterError::MetadataAbsent`].
pub fn split(text: &str) -> Result<(&str, &str), MatterError> {
    let rest = text
        .strip_prefix(DELIMITER)
        .ok_or(MatterError::MetadataAbsent)?;

    let second = rest.find(DELIMITER).ok_or(MatterError::MetadataAbsent)?;

    let metadata = &rest[..second];
    let body = &rest[second + DELIMITER.len()..];

    Ok((metadata, body))
}

/// Parse a metadata block into fields.
///
/// An empty block yields empty fields; a malformed block surfaces the YAML
/// error so the caller can decide how to report it.
pub fn parse_fields(metadata: &str) -> Result<Fields, serde_yaml::Error> {
    if metadata.trim().is_empty() {
        return Ok(Fields::new());
    }

    serde_yaml::from_str(metadata)
}
