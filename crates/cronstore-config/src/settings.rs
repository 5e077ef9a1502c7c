//! The option map supplied by the host scheduler.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Loosely-typed driver options, keyed by option name.
///
/// Values keep whatever shape the host gave them (strings, integers,
/// booleans); typed interpretation happens in [`crate::StoreSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, Value>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`Settings::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A string option, ignoring empty strings and non-string values.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// A string option where the empty string is meaningful (passwords).
    pub fn raw_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// A port given either as a non-empty string or as a positive integer,
    /// normalized to its string form.
    pub fn port(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => n.as_u64().filter(|p| *p > 0).map(|p| p.to_string()),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parse settings from KDL text.
///
/// Every top-level node is one option: `host "db.internal"`, `port 5433`.
pub fn parse_settings(kdl: &str) -> ConfigResult<Settings> {
    let doc: KdlDocument = kdl.parse()?;

    let mut settings = Settings::new();
    for node in doc.nodes() {
        let key = node.name().value();
        let value = get_first_arg(node)
            .ok_or_else(|| ConfigError::MissingField(format!("value for '{}'", key)))?;
        settings.insert(key, kdl_to_json(key, value)?);
    }

    Ok(settings)
}

fn get_first_arg(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .map(|e| e.value())
}

fn kdl_to_json(key: &str, value: &KdlValue) -> ConfigResult<Value> {
    if let Some(s) = value.as_string() {
        return Ok(Value::String(s.to_string()));
    }
    if let Some(i) = value.as_integer() {
        return i64::try_from(i)
            .map(Value::from)
            .map_err(|_| ConfigError::invalid(key, format!("integer {} out of range", i)));
    }
    if let Some(f) = value.as_float() {
        return serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| ConfigError::invalid(key, format!("non-finite number {}", f)));
    }
    if let Some(b) = value.as_bool() {
        return Ok(Value::Bool(b));
    }
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_settings() {
        let kdl = r#"
            host "db.internal"
            port 5433
            user "scheduler"
            sslmode "require"
        "#;

        let settings = parse_settings(kdl).unwrap();
        assert_eq!(settings.len(), 4);
        assert_eq!(settings.string("host"), Some("db.internal"));
        assert_eq!(settings.port("port"), Some("5433".to_string()));
        assert_eq!(settings.string("sslmode"), Some("require"));
    }

    #[test]
    fn test_parse_bool_and_float() {
        let settings = parse_settings("verbose #true\nratio 0.5").unwrap();
        assert_eq!(settings.get("verbose"), Some(&Value::Bool(true)));
        assert_eq!(settings.get("ratio").and_then(Value::as_f64), Some(0.5));
    }

    #[test]
    fn test_node_without_value_is_rejected() {
        let result = parse_settings("host");
        assert!(matches!(result.unwrap_err(), ConfigError::MissingField(_)));
    }

    #[test]
    fn test_invalid_kdl() {
        let result = parse_settings("host \"unterminated");
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_string_ignores_empty_and_non_strings() {
        let settings = Settings::new()
            .with("schema", "")
            .with("jobs_table", 42)
            .with("password", "");

        assert_eq!(settings.string("schema"), None);
        assert_eq!(settings.string("jobs_table"), None);
        assert_eq!(settings.raw_string("password"), Some(""));
    }

    #[test]
    fn test_port_normalization() {
        let settings: Settings = [
            ("a", Value::from("6543")),
            ("b", Value::from(6543u16)),
            ("c", Value::from(6543i64)),
            ("d", Value::from(-1)),
            ("e", Value::from("")),
            ("f", Value::Bool(true)),
        ]
        .into_iter()
        .collect();

        assert_eq!(settings.port("a"), Some("6543".to_string()));
        assert_eq!(settings.port("b"), Some("6543".to_string()));
        assert_eq!(settings.port("c"), Some("6543".to_string()));
        assert_eq!(settings.port("d"), None);
        assert_eq!(settings.port("e"), None);
        assert_eq!(settings.port("f"), None);
        assert_eq!(settings.port("missing"), None);
    }
}
