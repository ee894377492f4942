//! The flat field-value mapping collected from a filled form.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Value a checkbox-style control submits when it is ticked.
pub const CHECKBOX_ON: &str = "on";

/// Field names mapped to their submitted string values.
///
/// A field counts as present only when its value has at least one non-whitespace
/// character, so blank inputs degrade exactly like missing ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues {
    values: BTreeMap<String, String>,
}

impl FieldValues {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object of string values.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a flat JSON object of string values from `path`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Inserts a value and returns the updated mapping.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value of `name` when it is present and not blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Returns the value of `name`, or an empty string.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// Returns the value of `name`, or `placeholder` when it is absent.
    pub fn or<'a>(&'a self, name: &str, placeholder: &'a str) -> &'a str {
        self.get(name).unwrap_or(placeholder)
    }

    /// Whether `name` carries a non-blank value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether all of `names` are present.
    pub fn contains_all(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.contains(name))
    }

    /// Whether the checkbox `name` was ticked.
    pub fn is_checked(&self, name: &str) -> bool {
        self.values.get(name).map(String::as_str) == Some(CHECKBOX_ON)
    }

    /// Splits a multi-line field into trimmed, non-empty lines.
    pub fn lines(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|value| {
                value
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Iterates over the present fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .filter(|(_, value)| !value.trim().is_empty())
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> FromIterator<(K, V)> for FieldValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FieldValues::new();
        fields.extend(iter);
        fields
    }
}

impl<K, V> Extend<(K, V)> for FieldValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;

    #[test]
    fn blank_values_are_absent() {
        let fields = FieldValues::new().with("email", "   ").with("city", "Київ");
        assert_eq!(fields.get("email"), None);
        assert_eq!(fields.or("email", "Не вказано"), "Не вказано");
        assert_eq!(fields.get("city"), Some("Київ"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn checkbox_requires_literal_on() {
        let ticked = FieldValues::new().with("addStamp", "on");
        assert!(ticked.is_checked("addStamp"));
        assert!(!FieldValues::new().with("addStamp", "off").is_checked("addStamp"));
        assert!(!FieldValues::new().with("addStamp", "true").is_checked("addStamp"));
        assert!(!FieldValues::new().is_checked("addStamp"));
    }

    #[test]
    fn lines_are_trimmed_and_blank_lines_dropped() {
        let fields = FieldValues::new().with("agenda", "  x \r\n\ny\n z\n");
        assert_eq!(fields.lines("agenda"), vec!["x", "y", "z"]);
        assert!(fields.lines("missing").is_empty());
    }

    #[test]
    fn deserializes_from_flat_json() {
        let fields = FieldValues::from_json(r#"{"firstName":"A","lastName":"B"}"#)
            .expect("valid json");
        assert!(fields.contains_all(&["firstName", "lastName"]));
        assert!(!fields.contains("phone"));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        for raw in [r#"{"firstName":"#, r#"["A", "B"]"#, r#"{"age": 42}"#] {
            match FieldValues::from_json(raw) {
                Err(DocumentError::Json(_)) => {}
                other => panic!("expected a JSON error for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        match FieldValues::from_json_file(dir.path().join("missing.json")) {
            Err(DocumentError::Io(err)) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn reads_field_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("letter.json");
        fs::write(&path, r#"{"subject":"Тема"}"#).expect("write fixture");
        let fields = FieldValues::from_json_file(&path).expect("readable file");
        assert_eq!(fields.get("subject"), Some("Тема"));
    }
}
