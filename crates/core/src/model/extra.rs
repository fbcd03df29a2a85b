use std::collections::BTreeMap;

use serde::Serialize;

/// One value from a record's `extra` context.
///
/// Nested objects and arrays are not inspected by any tally, so they are kept
/// as their compact JSON text.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ExtraValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Nested(String),
}

impl From<&serde_json::Value> for ExtraValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            nested => Self::Nested(nested.to_string()),
        }
    }
}

/// Structured per-record context. Every accessor returns `None` when the key
/// is absent or holds a different kind of value.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Extra(BTreeMap<String, ExtraValue>);

impl Extra {
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        let Some(serde_json::Value::Object(map)) = value else {
            return Self::default();
        };
        Self(
            map.iter()
                .map(|(k, v)| (k.clone(), ExtraValue::from(v)))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&ExtraValue> {
        self.0.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ExtraValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(ExtraValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(ExtraValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ExtraValue)> for Extra {
    fn from_iter<I: IntoIterator<Item = (String, ExtraValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_default_on_type_mismatch() {
        let raw = serde_json::json!({
            "operation": "db_query",
            "record_count": 42,
            "success": true,
            "loan": {"loan_id": "LOAN-0001"},
            "note": null,
        });
        let extra = Extra::from_json(Some(&raw));

        assert_eq!(extra.str("operation"), Some("db_query"));
        assert_eq!(extra.number("record_count"), Some(42.0));
        assert_eq!(extra.bool("success"), Some(true));
        assert_eq!(extra.str("record_count"), None);
        assert_eq!(extra.number("operation"), None);
        assert_eq!(extra.bool("missing"), None);
        assert_eq!(extra.get("note"), Some(&ExtraValue::Null));
        assert!(matches!(extra.get("loan"), Some(ExtraValue::Nested(s)) if s.contains("LOAN-0001")));
    }

    #[test]
    fn non_object_extra_is_empty() {
        assert!(Extra::from_json(Some(&serde_json::json!("oops"))).is_empty());
        assert!(Extra::from_json(Some(&serde_json::json!([1, 2]))).is_empty());
        assert!(Extra::from_json(None).is_empty());
    }
}
