//! Loosely typed values exchanged with the request handler.
//!
//! Handlers in an embedding runtime rarely hand back a typed struct. They hand
//! back whatever their interpreter produced: a list with a `status` entry, a
//! character vector of body chunks, a raw vector. [`Value`] models that shape so
//! the adapter can validate it at the boundary instead of trusting it.

use serde::{Deserialize, Serialize};

/// A dynamically shaped value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Integer(i64),
    Double(f64),
    /// An unnamed character vector.
    Text(Vec<String>),
    /// A character vector whose elements carry names.
    Named(Vec<(String, String)>),
    Raw(Vec<u8>),
    /// A named list of arbitrary values.
    List(Vec<(String, Value)>),
}

impl Value {
    /// A one-element character vector.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(vec![s.into()])
    }

    /// Look up an element of a [`Value::List`] by name.
    ///
    /// Returns `None` for every other variant, and for a `Value::Null` element
    /// so that an explicit null behaves like an absent field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::List(items) => items
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v)
                .filter(|v| !matches!(v, Value::Null)),
            _ => None,
        }
    }

    /// The single string held by a length-one character vector.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(items) if items.len() == 1 => Some(&items[0]),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Text(_) => "character",
            Value::Named(_) => "named character",
            Value::Raw(_) => "raw",
            Value::List(_) => "list",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Raw(bytes)
    }
}

/// JSON maps onto the closest value shape:
///
/// * numbers become `Integer` when integral, `Double` otherwise
/// * a string becomes a one-element `Text`; an array of strings becomes `Text`
/// * an object whose members are all strings becomes `Named`
/// * any other object becomes a `List`; any other array a `List` keyed by index
/// * booleans become `Integer` 0/1
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Integer(i64::from(b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::text(s),
            Json::Array(items) => {
                if items.iter().all(|v| v.is_string()) {
                    Value::Text(
                        items
                            .into_iter()
                            .filter_map(|v| match v {
                                Json::String(s) => Some(s),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    Value::List(
                        items
                            .into_iter()
                            .enumerate()
                            .map(|(i, v)| (i.to_string(), Value::from(v)))
                            .collect(),
                    )
                }
            }
            Json::Object(members) => {
                if !members.is_empty() && members.values().all(|v| v.is_string()) {
                    Value::Named(
                        members
                            .into_iter()
                            .filter_map(|(k, v)| match v {
                                Json::String(s) => Some((k, s)),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    Value::List(members.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
                }
            }
        }
    }
}

impl Value {
    /// Parse a JSON document into a value.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        let json: serde_json::Value = serde_json::from_str(input)?;
        Ok(Value::from(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_lookup_skips_null() {
        let value = Value::List(vec![
            ("status".to_string(), Value::Integer(200)),
            ("body".to_string(), Value::Null),
        ]);
        assert_eq!(value.get("status"), Some(&Value::Integer(200)));
        assert_eq!(value.get("body"), None);
        assert_eq!(value.get("headers"), None);
        assert_eq!(Value::Integer(1).get("status"), None);
    }

    #[test]
    fn test_json_object_shapes() {
        let value = Value::from(json!({
            "status": 201,
            "headers": {"Content-Type": "text/plain", "X-Test": "1"},
            "body": ["Hello, ", "World"]
        }));

        assert_eq!(value.get("status"), Some(&Value::Integer(201)));
        assert_eq!(
            value.get("headers"),
            Some(&Value::Named(vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("X-Test".to_string(), "1".to_string()),
            ]))
        );
        assert_eq!(
            value.get("body"),
            Some(&Value::Text(vec!["Hello, ".to_string(), "World".to_string()]))
        );
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(Value::from(json!(2.5)), Value::Double(2.5));
        assert_eq!(Value::from(json!(true)), Value::Integer(1));
        assert_eq!(Value::from(json!("x")).as_str(), Some("x"));
        assert_eq!(Value::from(json!(null)), Value::Null);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Value::from_json("{\"status\": ").is_err());
        assert_eq!(Value::from_json("[1, \"a\"]").unwrap().kind(), "list");
    }
}
