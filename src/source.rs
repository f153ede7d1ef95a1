//! Raw record sources.
//!
//! A [`RawRecordSource`] yields groups of raw chat records together with the
//! metadata of the group (widget/embed) they belong to. Fetching over HTTP is
//! left to other implementations; [`JsonFileSource`] reads a dump on disk:
//!
//! ```text
//! {"embeds": [
//!   {"uuid": "abc", "name": "Portal", "chats": [{"id": 1, "prompt": "hi"}]}
//! ]}
//! ```
//!
//! A bare top-level array of group objects is accepted too, and `records`
//! works as an alias for `chats`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ChatsiftError, Result};

const GROUP_LIST_KEYS: &[&str] = &["embeds", "groups"];
const RECORD_LIST_KEYS: &[&str] = &["chats", "records"];

/// One group's metadata and its raw records, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGroup {
    /// Group metadata (id, name, workspace, ...), without the record list.
    pub metadata: Value,
    /// Raw chat records.
    pub records: Vec<Value>,
}

impl RawGroup {
    pub fn new(metadata: Value, records: Vec<Value>) -> Self {
        Self { metadata, records }
    }

    /// Splits a group object into metadata and its record list.
    fn from_object(mut obj: Map<String, Value>) -> Self {
        let mut records = Vec::new();
        for key in RECORD_LIST_KEYS {
            if let Some(value) = obj.remove(*key) {
                if records.is_empty() {
                    if let Value::Array(items) = value {
                        records = items;
                    }
                }
            }
        }
        Self {
            metadata: Value::Object(obj),
            records,
        }
    }
}

/// A supplier of raw groups.
pub trait RawRecordSource {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Returns every group with its records.
    fn groups(&self) -> Result<Vec<RawGroup>>;
}

impl RawRecordSource for Vec<RawGroup> {
    fn describe(&self) -> String {
        format!("in-memory ({} groups)", self.len())
    }

    fn groups(&self) -> Result<Vec<RawGroup>> {
        Ok(self.clone())
    }
}

/// Reads groups from a JSON dump on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses groups from JSON text.
    pub fn parse_str(text: &str) -> Result<Vec<RawGroup>> {
        let value: Value = serde_json::from_str(text)?;
        let list = match value {
            Value::Array(items) => items,
            Value::Object(mut obj) => GROUP_LIST_KEYS
                .iter()
                .find_map(|key| match obj.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .ok_or_else(|| {
                    ChatsiftError::invalid_format(
                        "raw export",
                        "expected a top-level array or an object with an \"embeds\" array",
                    )
                })?,
            _ => {
                return Err(ChatsiftError::invalid_format(
                    "raw export",
                    "top-level value must be an array or object",
                ));
            }
        };

        let mut groups = Vec::with_capacity(list.len());
        for (idx, item) in list.into_iter().enumerate() {
            match item {
                Value::Object(obj) => groups.push(RawGroup::from_object(obj)),
                other => warn!(index = idx, kind = %json_kind(&other), "skipping non-object group entry"),
            }
        }
        Ok(groups)
    }
}

impl RawRecordSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn groups(&self) -> Result<Vec<RawGroup>> {
        let text = fs::read_to_string(&self.path)?;
        let groups = Self::parse_str(&text)?;
        debug!(path = %self.path.display(), groups = groups.len(), "read raw export");
        Ok(groups)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_embeds_object() {
        let text = r#"{"embeds": [{"uuid": "a", "name": "Portal", "chats": [{"id": 1}, {"id": 2}]}]}"#;
        let groups = JsonFileSource::parse_str(text).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[0].metadata, json!({"uuid": "a", "name": "Portal"}));
    }

    #[test]
    fn test_parse_top_level_array_with_records_alias() {
        let text = r#"[{"uuid": "a", "records": [{"id": 1}]}, 5, {"uuid": "b"}]"#;
        let groups = JsonFileSource::parse_str(text).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].records.len(), 1);
        assert!(groups[1].records.is_empty());
    }

    #[test]
    fn test_parse_rejects_scalar() {
        let err = JsonFileSource::parse_str("42").unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_parse_rejects_object_without_list() {
        let err = JsonFileSource::parse_str(r#"{"data": 1}"#).unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"uuid": "a", "chats": [{{"prompt": "hi"}}]}}]"#).unwrap();
        let source = JsonFileSource::new(file.path());
        let groups = source.groups().unwrap();
        assert_eq!(groups[0].records[0]["prompt"], "hi");
        assert!(source.describe().contains(&*file.path().to_string_lossy()));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = JsonFileSource::new("/nonexistent/raw.json").groups().unwrap_err();
        assert!(err.is_io());
    }
}
