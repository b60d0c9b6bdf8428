//! HTTP boundary to the user directory service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::model::NewUser;

/// The two calls the console makes.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// `GET /getUsers`, returning the decoded body whatever its shape.
    async fn get_users(&self) -> Result<Value, TransportError>;

    /// `POST /addUser`. The response body is ignored.
    async fn add_user(&self, user: &NewUser) -> Result<(), TransportError>;
}

/// `reqwest`-backed client.
#[derive(Clone, Debug)]
pub struct HttpUserApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("userdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request {
                url: base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn get_users(&self) -> Result<Value, TransportError> {
        let url = self.url("getUsers");
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        let resp = check_status(&url, resp).await?;
        let text = resp.text().await.map_err(|e| TransportError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;
        Ok(parse_body(text))
    }

    async fn add_user(&self, user: &NewUser) -> Result<(), TransportError> {
        let url = self.url("addUser");
        debug!(%url, name = %user.name, "POST");
        let resp = self
            .client
            .post(&url)
            .json(user)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;
        check_status(&url, resp).await?;
        Ok(())
    }
}

/// A successful body that is not JSON is handed on as a string and left for
/// the normalizer to reject.
fn parse_body(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            debug!(%err, "response body is not JSON");
            Value::String(text)
        }
    }
}

fn request_error(url: &str, e: &reqwest::Error) -> TransportError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "could not connect to server".to_string()
    } else {
        e.to_string()
    };
    TransportError::Request {
        url: url.to_string(),
        message,
    }
}

async fn check_status(url: &str, resp: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(TransportError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        message: error_body_message(&body),
    })
}

/// Pull a human-readable message out of an error body: a JSON `message` or
/// `error` string, else the raw text if it is short and non-empty.
pub fn error_body_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return ["message", "error"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string);
    }
    (trimmed.len() <= 200 && !trimmed.starts_with('<')).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_json_body() {
        assert_eq!(
            error_body_message(r#"{"error":"email already exists"}"#).as_deref(),
            Some("email already exists")
        );
        assert_eq!(
            error_body_message(r#"{"message":"bad","error":"worse"}"#).as_deref(),
            Some("bad")
        );
        assert_eq!(error_body_message(r#"{"code":11000}"#), None);
    }

    #[test]
    fn error_message_from_plain_text() {
        assert_eq!(error_body_message("Service Unavailable\n").as_deref(), Some("Service Unavailable"));
        assert_eq!(error_body_message("<html><body>502</body></html>"), None);
        assert_eq!(error_body_message("   "), None);
    }

    #[test]
    fn non_json_success_body_becomes_a_string() {
        assert_eq!(parse_body(r#"{"data":[]}"#.into()), serde_json::json!({"data": []}));
        assert_eq!(parse_body("oops".into()), Value::String("oops".into()));
        assert_eq!(parse_body(String::new()), Value::String(String::new()));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = HttpUserApi::new("http://localhost:5000/", Duration::from_secs(5)).expect("client");
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(api.url("getUsers"), "http://localhost:5000/getUsers");
    }
}
