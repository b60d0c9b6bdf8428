//! Interpret a `getUsers` response body of unknown shape.
//!
//! The service has returned a bare array, an envelope such as
//! `{"data": [...]}`, and a keyed map of user objects over time. Each shape is
//! one [`ResponseShape`] variant; anything else degrades to an empty list.

use serde_json::{Map, Value};

use crate::error::MalformedResponse;
use crate::model::UserRecord;

/// Envelope keys checked before falling back to the first array field.
const ENVELOPE_KEYS: [&str; 4] = ["data", "users", "items", "results"];

/// How a response body was classified.
#[derive(Debug, PartialEq)]
pub enum ResponseShape<'a> {
    /// The body is the list itself.
    Sequence(&'a [Value]),
    /// The body is an object with an array-valued field.
    KeyedWithArray { key: &'a str, items: &'a [Value] },
    /// The body is an object without array fields; its object values are users.
    KeyedObjects(&'a Map<String, Value>),
    /// Null or a scalar.
    Unrecognized(&'static str),
}

impl<'a> ResponseShape<'a> {
    /// Classify a body. Sequence is checked first.
    pub fn classify(body: &'a Value) -> Self {
        match body {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => match array_field(map) {
                Some((key, items)) => Self::KeyedWithArray { key, items },
                None => Self::KeyedObjects(map),
            },
            Value::Null => Self::Unrecognized("null"),
            Value::Bool(_) => Self::Unrecognized("boolean"),
            Value::Number(_) => Self::Unrecognized("number"),
            Value::String(_) => Self::Unrecognized("string"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::KeyedWithArray { .. } => "keyed-with-array",
            Self::KeyedObjects(_) => "keyed-objects",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

fn array_field(map: &Map<String, Value>) -> Option<(&str, &[Value])> {
    for key in ENVELOPE_KEYS {
        if let Some(Value::Array(items)) = map.get(key) {
            return Some((key, items.as_slice()));
        }
    }
    map.iter().find_map(|(k, v)| match v {
        Value::Array(items) => Some((k.as_str(), items.as_slice())),
        _ => None,
    })
}

/// Result of normalizing one response.
#[derive(Debug, Default, PartialEq)]
pub struct Normalized {
    pub users: Vec<UserRecord>,
    /// Set when the body was not a shape we understand.
    pub diagnostic: Option<MalformedResponse>,
}

/// Turn any decoded body into the canonical ordered list. Never fails.
pub fn normalize(body: &Value) -> Normalized {
    let shape = ResponseShape::classify(body);
    match shape {
        ResponseShape::Sequence(items) | ResponseShape::KeyedWithArray { items, .. } => Normalized {
            users: items.iter().map(UserRecord::from_value).collect(),
            diagnostic: None,
        },
        ResponseShape::KeyedObjects(map) => Normalized {
            users: map
                .values()
                .filter(|v| v.is_object())
                .map(UserRecord::from_value)
                .collect(),
            diagnostic: None,
        },
        ResponseShape::Unrecognized(found) => Normalized {
            users: Vec::new(),
            diagnostic: Some(MalformedResponse { found }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(n: &Normalized) -> Vec<Option<&str>> {
        n.users.iter().map(|u| u.name.as_deref()).collect()
    }

    #[test]
    fn sequence_is_used_as_is() {
        let body = json!([
            {"name": "Ann", "email": "a@x.com"},
            {"name": "Bob", "email": "b@x.com"}
        ]);
        let out = normalize(&body);
        assert_eq!(
            out.users,
            vec![UserRecord::new("Ann", "a@x.com"), UserRecord::new("Bob", "b@x.com")]
        );
        assert!(out.diagnostic.is_none());
    }

    #[test]
    fn data_envelope_is_unwrapped() {
        let body = json!({"status": "ok", "data": [{"name": "Ann"}]});
        assert_eq!(names(&normalize(&body)), vec![Some("Ann")]);
        assert_eq!(ResponseShape::classify(&body).label(), "keyed-with-array");
    }

    #[test]
    fn envelope_key_beats_earlier_array_field() {
        let body = json!({"tags": ["a", "b"], "users": [{"name": "Cy"}]});
        match ResponseShape::classify(&body) {
            ResponseShape::KeyedWithArray { key, .. } => assert_eq!(key, "users"),
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!(names(&normalize(&body)), vec![Some("Cy")]);
    }

    #[test]
    fn first_array_field_in_document_order_otherwise() {
        let body = json!({"count": 2, "rows": [{"name": "Dee"}], "more": [{"name": "Eve"}]});
        assert_eq!(names(&normalize(&body)), vec![Some("Dee")]);
    }

    #[test]
    fn keyed_objects_keep_enumeration_order() {
        let body = json!({"a": 1, "b": {"name": "x"}, "c": {"name": "y"}});
        let out = normalize(&body);
        assert_eq!(names(&out), vec![Some("x"), Some("y")]);
        assert!(out.diagnostic.is_none());
    }

    #[test]
    fn keyed_without_objects_is_empty_without_diagnostic() {
        let out = normalize(&json!({"a": 1, "b": "two"}));
        assert!(out.users.is_empty());
        assert!(out.diagnostic.is_none());
    }

    #[test]
    fn scalars_and_null_degrade_to_empty() {
        for body in [json!(null), json!(42), json!("oops"), json!(true)] {
            let out = normalize(&body);
            assert!(out.users.is_empty(), "{body}");
            assert!(out.diagnostic.is_some(), "{body}");
        }
        assert_eq!(
            normalize(&json!("oops")).diagnostic,
            Some(MalformedResponse { found: "string" })
        );
    }

    #[test]
    fn non_object_elements_become_blank_records() {
        let out = normalize(&json!([{"name": "Ann"}, 3]));
        assert_eq!(out.users.len(), 2);
        assert_eq!(out.users[1], UserRecord::default());
    }
}
