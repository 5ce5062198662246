// src/document.rs

//! Generic document model shared by every source dialect.
//!
//! A reader decodes its bytes into the dialect's own value tree
//! (`serde_json::Value`, `serde_yaml::Value`) and lowers it here into a flat
//! map of field name to [`GenericValue`]. Classifiers only ever look at this
//! model, so they never see nested structures: anything that is not a
//! string, an integer, or a list of strings is kept as
//! [`GenericValue::Invalid`] and rejected field by field.

use std::collections::BTreeMap;

use crate::logging::FileLog;

/// A dynamically-typed field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericValue {
    String(String),
    Integer(i64),
    ListOfString(Vec<String>),
    /// Shape that none of the above accepts; holds a description of what was found
    Invalid(String),
}

impl GenericValue {
    /// Short name of the value's shape, for log lines
    pub fn kind(&self) -> &str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::ListOfString(_) => "list of strings",
            Self::Invalid(found) => found,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::ListOfString(list) => Some(list),
            _ => None,
        }
    }

    /// Lower a JSON value
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(s) => Self::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Invalid(format!("number {}", n)),
            },
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => list.push(s.clone()),
                        other => {
                            return Self::Invalid(format!(
                                "list with {} element",
                                json_kind(other)
                            ));
                        }
                    }
                }
                Self::ListOfString(list)
            }
            other => Self::Invalid(json_kind(other).to_string()),
        }
    }

    /// Lower a YAML value
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::String(s) => Self::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Invalid(format!("number {}", n)),
            },
            Value::Sequence(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => list.push(s.clone()),
                        other => {
                            return Self::Invalid(format!(
                                "list with {} element",
                                yaml_kind(other)
                            ));
                        }
                    }
                }
                Self::ListOfString(list)
            }
            other => Self::Invalid(yaml_kind(other).to_string()),
        }
    }
}

impl From<&str> for GenericValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for GenericValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<Vec<String>> for GenericValue {
    fn from(list: Vec<String>) -> Self {
        Self::ListOfString(list)
    }
}

impl From<&[&str]> for GenericValue {
    fn from(list: &[&str]) -> Self {
        Self::ListOfString(list.iter().map(|s| s.to_string()).collect())
    }
}

/// Field name to value mapping decoded from one input file
///
/// Keys are case-sensitive. Iteration is in key order so that repeated
/// classification of the same document is deterministic, but no rule
/// depends on the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericDocument {
    fields: BTreeMap<String, GenericValue>,
}

impl GenericDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<GenericValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&GenericValue> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut GenericValue> {
        self.fields.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenericValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build from a decoded JSON object
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = object
            .iter()
            .map(|(k, v)| (k.clone(), GenericValue::from_json(v)))
            .collect();
        Self { fields }
    }

    /// Build from a decoded YAML mapping
    ///
    /// Scalar keys that are not strings are stringified; keys that are
    /// collections cannot name a field and are skipped.
    pub fn from_yaml_mapping(mapping: &serde_yaml::Mapping, log: &FileLog) -> Self {
        use serde_yaml::Value;

        let mut fields = BTreeMap::new();
        for (k, v) in mapping {
            let key = match k {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    log.warn(format!(
                        "YAML key of type {} cannot name a field, skipped",
                        yaml_kind(other)
                    ));
                    continue;
                }
            };
            fields.insert(key, GenericValue::from_yaml(v));
        }
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<GenericValue>> FromIterator<(K, V)> for GenericDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fields }
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_json_shapes() {
        let value: serde_json::Value = serde_json::json!({
            "title": "x",
            "n": 3,
            "list": ["a", "b"],
            "mixed": ["a", 1],
            "nested": {"a": ["b"]},
            "flag": true,
        });
        let doc = GenericDocument::from_json_object(value.as_object().unwrap());

        assert_eq!(doc.get("title"), Some(&GenericValue::String("x".to_string())));
        assert_eq!(doc.get("n"), Some(&GenericValue::Integer(3)));
        assert_eq!(
            doc.get("list").and_then(GenericValue::as_list),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(doc.get("mixed").unwrap().kind(), "list with number element");
        assert_eq!(doc.get("nested").unwrap().kind(), "object");
        assert_eq!(doc.get("flag").unwrap().kind(), "bool");
    }

    #[test]
    fn test_lower_yaml_keys() {
        let log = FileLog::new("keys.yaml");
        let value: serde_yaml::Value =
            serde_yaml::from_str("1: [a]\ntrue: [b]\nplain: [c]\n? [x]\n: [d]\n").unwrap();
        let doc = GenericDocument::from_yaml_mapping(value.as_mapping().unwrap(), &log);

        assert_eq!(doc.len(), 3);
        assert!(doc.contains_key("1"));
        assert!(doc.contains_key("true"));
        assert!(doc.contains_key("plain"));
        assert_eq!(log.messages().len(), 1);
    }

    #[test]
    fn test_empty_list_is_list() {
        let value: serde_yaml::Value = serde_yaml::from_str("[]").unwrap();
        assert_eq!(GenericValue::from_yaml(&value), GenericValue::ListOfString(vec![]));
    }
}
