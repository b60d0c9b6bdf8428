use serde::Serialize;
use serde_json::Value;

pub const NAME_PLACEHOLDER: &str = "Unnamed user";
pub const EMAIL_PLACEHOLDER: &str = "No email";

/// One entry of the canonical user list.
///
/// The service contract is loose, so every field is optional. Use
/// [`UserRecord::display_name`] and [`UserRecord::display_email`] when
/// rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub id: Option<String>,
}

impl UserRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            id: None,
        }
    }

    /// Build a record from one element of a user list response.
    ///
    /// Non-object values yield a record with every field absent. Scalar
    /// fields are accepted as strings; numbers and booleans are rendered.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let id = map
            .get("id")
            .or_else(|| map.get("_id"))
            .and_then(scalar_to_string);
        Self {
            name: map.get("name").and_then(scalar_to_string),
            email: map.get("email").and_then(scalar_to_string),
            id,
        }
    }

    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or(NAME_PLACEHOLDER)
    }

    pub fn display_email(&self) -> &str {
        non_blank(self.email.as_deref()).unwrap_or(EMAIL_PLACEHOLDER)
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Body of `POST /addUser`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_reads_known_fields() {
        let r = UserRecord::from_value(&json!({"name": "Ann", "email": "a@x.com", "id": 7}));
        assert_eq!(r.name.as_deref(), Some("Ann"));
        assert_eq!(r.email.as_deref(), Some("a@x.com"));
        assert_eq!(r.id.as_deref(), Some("7"));
    }

    #[test]
    fn mongo_style_id_is_accepted() {
        let r = UserRecord::from_value(&json!({"_id": "65f0c1", "name": "Bob"}));
        assert_eq!(r.id.as_deref(), Some("65f0c1"));
        assert_eq!(r.email, None);
    }

    #[test]
    fn non_object_yields_empty_record() {
        assert_eq!(UserRecord::from_value(&json!("oops")), UserRecord::default());
        assert_eq!(UserRecord::from_value(&json!(null)), UserRecord::default());
    }

    #[test]
    fn placeholders_cover_missing_and_blank_fields() {
        let r = UserRecord {
            name: Some("   ".into()),
            email: None,
            id: None,
        };
        assert_eq!(r.display_name(), NAME_PLACEHOLDER);
        assert_eq!(r.display_email(), EMAIL_PLACEHOLDER);
    }
}
