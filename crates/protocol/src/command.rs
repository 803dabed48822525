//! Command parameters posted to a worker's driver endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Field carrying the command name in a driver request.
pub const CMD_FIELD: &str = "cmd";

/// Field carrying the session identifier in a driver request.
pub const SESSION_ID_FIELD: &str = "sessionId";

/// Command value telling a worker its current session is complete.
pub const CMD_TEST_COMPLETE: &str = "testComplete";

/// Multi-valued command parameters for a driver request.
///
/// A field name maps to one or more string values; repeated values for the
/// same field are preserved in insertion order. The hub never interprets
/// the fields; they travel to the worker verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandParameters {
    fields: HashMap<String, Vec<String>>,
}

impl CommandParameters {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field` to the single value `value`, replacing any existing values.
    pub fn set(&mut self, field: &str, value: &str) {
        self.fields
            .insert(field.to_string(), vec![value.to_string()]);
    }

    /// Appends `value` to `field`, keeping any values already present.
    pub fn append(&mut self, field: &str, value: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Returns all values for `field`, or [`None`] if the field is absent.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns the first value for `field`, or [`None`] if the field is absent.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns true if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of distinct fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Flattens the map into `(field, value)` pairs for form encoding.
    ///
    /// Multi-valued fields produce one pair per value, so the encoded body
    /// repeats the key, which is the shape the worker's driver endpoint
    /// expects.
    pub fn form_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (field, values) in &self.fields {
            for value in values {
                pairs.push((field.as_str(), value.as_str()));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_values() {
        let mut params = CommandParameters::new();
        params.append("cmd", "open");
        params.append("cmd", "click");
        params.set("cmd", "close");

        assert_eq!(params.get("cmd"), Some(&["close".to_string()][..]));
    }

    #[test]
    fn append_accumulates_values() {
        let mut params = CommandParameters::new();
        params.append("value", "a");
        params.append("value", "b");

        assert_eq!(
            params.get("value"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(params.first("value"), Some("a"));
    }

    #[test]
    fn form_pairs_repeats_multi_valued_fields() {
        let mut params = CommandParameters::new();
        params.append("value", "a");
        params.append("value", "b");

        let pairs = params.form_pairs();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("value", "a")));
        assert!(pairs.contains(&("value", "b")));
    }

    #[test]
    fn missing_field_reads_as_none() {
        let params = CommandParameters::new();
        assert!(params.is_empty());
        assert_eq!(params.get("cmd"), None);
        assert_eq!(params.first("cmd"), None);
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut params = CommandParameters::new();
        params.set("cmd", "click");

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({"cmd": ["click"]}));
    }
}
