//! Group-name resolution.
//!
//! Raw exports identify their source widget by an opaque id. A
//! [`GroupNameResolver`] maps that id to a display name; lookups are
//! case-insensitive. [`GroupNameMap`] is the file-backed implementation,
//! loaded from either a JSON object or a two-column CSV/TSV file:
//!
//! ```text
//! {"0f134195-08a0-451b-b6fb-62fd9547df95": "Portal"}
//! ```
//!
//! ```text
//! uuid,name
//! 0f134195-08a0-451b-b6fb-62fd9547df95,Portal
//! ```
//!
//! The map is an explicit value handed to the
//! [`DocumentBuilder`](crate::core::DocumentBuilder), so two runs with
//! different maps never interfere.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ChatsiftError, Result};

const HEADER_KEYS: &[&str] = &["uuid", "embed_id", "embed_uuid", "id"];
const HEADER_NAMES: &[&str] = &["name", "embed_name"];

/// Looks up a display name for a raw group identifier.
pub trait GroupNameResolver: Send + Sync {
    /// Returns the display name for `group_id`, matched case-insensitively.
    fn lookup(&self, group_id: &str) -> Option<&str>;
}

/// A case-insensitive id → display-name map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupNameMap {
    names: HashMap<String, String>,
}

impl GroupNameMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. The key is stored lower-cased.
    #[must_use]
    pub fn with_entry(mut self, group_id: impl AsRef<str>, name: impl Into<String>) -> Self {
        self.insert(group_id, name);
        self
    }

    pub fn insert(&mut self, group_id: impl AsRef<str>, name: impl Into<String>) {
        self.names
            .insert(group_id.as_ref().trim().to_lowercase(), name.into());
    }

    /// Loads a map from a `.json`, `.csv`, `.tsv` or extension-less file.
    ///
    /// Fails on unreadable files, unsupported extensions, a JSON document
    /// that is not an object, or a tabular file with no entries.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let map = match ext.as_str() {
            "json" => Self::from_json_str(&std::fs::read_to_string(path)?),
            "csv" | "" => Self::from_reader(File::open(path)?, b','),
            "tsv" => Self::from_reader(File::open(path)?, b'\t'),
            other => Err(ChatsiftError::invalid_group_map(
                None,
                format!("unsupported extension '.{other}' (expected .json, .csv or .tsv)"),
            )),
        };

        let map = map.map_err(|e| match e {
            ChatsiftError::InvalidGroupMap { message, .. } => {
                ChatsiftError::invalid_group_map(Some(path.to_path_buf()), message)
            }
            other => other,
        })?;
        debug!(path = %path.display(), entries = map.len(), "loaded group map");
        Ok(map)
    }

    /// Loads a map, degrading to an empty one (with a warning) on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_path(path) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load group map; using built-in defaults");
                Self::default()
            }
        }
    }

    /// Parses a JSON object of `{id: name}`. Non-string names are stringified.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(obj) = value else {
            return Err(ChatsiftError::invalid_group_map(
                None,
                "JSON group map must be an object at top level",
            ));
        };
        let mut map = Self::new();
        for (key, value) in obj {
            let name = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            map.insert(key, name);
        }
        Ok(map)
    }

    /// Parses two-column delimited rows, skipping a recognizable header row.
    pub fn from_reader<R: std::io::Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut map = Self::new();
        for record in rdr.records() {
            let record = record?;
            let key = record.get(0).map(str::trim).unwrap_or_default();
            let name = record.get(1).map(str::trim).unwrap_or_default();
            if is_header(key, name) || key.is_empty() {
                continue;
            }
            map.insert(key, name);
        }

        if map.is_empty() {
            return Err(ChatsiftError::invalid_group_map(None, "no entries found"));
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns `true` if `group_id` has an entry.
    pub fn contains(&self, group_id: &str) -> bool {
        self.names.contains_key(&group_id.trim().to_lowercase())
    }
}

impl GroupNameResolver for GroupNameMap {
    fn lookup(&self, group_id: &str) -> Option<&str> {
        self.names
            .get(&group_id.trim().to_lowercase())
            .map(String::as_str)
    }
}

fn is_header(key: &str, name: &str) -> bool {
    HEADER_KEYS.contains(&key.to_lowercase().as_str())
        && HEADER_NAMES.contains(&name.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = GroupNameMap::new().with_entry("ABC-123", "Portal");
        assert_eq!(map.lookup("abc-123"), Some("Portal"));
        assert_eq!(map.lookup("ABC-123"), Some("Portal"));
        assert!(map.lookup("other").is_none());
    }

    #[test]
    fn test_json_map() {
        let file = temp_with(".json", r#"{"AAA": "Portal", "bbb": "Forum"}"#);
        let map = GroupNameMap::from_path(file.path()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup("aaa"), Some("Portal"));
    }

    #[test]
    fn test_json_map_must_be_object() {
        let file = temp_with(".json", r#"["a", "b"]"#);
        let err = GroupNameMap::from_path(file.path()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(".json"));
    }

    #[test]
    fn test_csv_map_with_header() {
        let file = temp_with(".csv", "uuid,name\nAAA,Portal\n,Nameless\nbbb,Forum\n");
        let map = GroupNameMap::from_path(file.path()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup("AAA"), Some("Portal"));
        assert!(!map.contains("uuid"));
    }

    #[test]
    fn test_csv_map_without_header() {
        let file = temp_with(".csv", "aaa,Portal\nbbb\n");
        let map = GroupNameMap::from_path(file.path()).unwrap();
        assert_eq!(map.lookup("aaa"), Some("Portal"));
        assert_eq!(map.lookup("bbb"), Some(""));
    }

    #[test]
    fn test_tsv_map() {
        let file = temp_with(".tsv", "embed_id\tembed_name\naaa\tPortal\n");
        let map = GroupNameMap::from_path(file.path()).unwrap();
        assert_eq!(map.lookup("aaa"), Some("Portal"));
    }

    #[test]
    fn test_empty_csv_is_error() {
        let file = temp_with(".csv", "uuid,name\n");
        assert!(GroupNameMap::from_path(file.path()).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_with(".xml", "<map/>");
        let err = GroupNameMap::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported extension"));
    }

    #[test]
    fn test_load_or_default_degrades() {
        let map = GroupNameMap::load_or_default(Some(Path::new("/nonexistent/map.json")));
        assert!(map.is_empty());
        assert!(GroupNameMap::load_or_default(None).is_empty());
    }
}
