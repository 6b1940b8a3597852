use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A chat message as the server returns it, and as the client holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub content: String,
    pub room: String,
    pub created_at: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Error body the API attaches to failed auth calls.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub content: &'a str,
    pub room: &'a str,
}

// The server hands out integer ids for persisted messages while the live
// feed and placeholders use strings; normalize to strings on the way in.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid message id: {other}"))),
    }
}

/// Same as [`id_string`] but tolerates a missing or null id, which the live
/// feed is allowed to omit.
pub(crate) fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!("invalid message id: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_deserializes_with_numeric_id() {
        let json = r#"{"id":1,"content":"hi","room":"global","created_at":"2024-01-01T00:00:00Z","user_id":"bob"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "1");
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.room, "global");
        assert_eq!(msg.user_id, "bob");
    }

    #[test]
    fn message_deserializes_with_string_id() {
        let json = r#"{"id":"tmp-42","content":"x","room":"global","created_at":"2024-01-01T00:00:00Z","user_id":"anon"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "tmp-42");
    }

    #[test]
    fn login_response_carries_the_access_token() {
        let body: LoginResponse = serde_json::from_str(r#"{"access_token":"tok123"}"#).unwrap();
        assert_eq!(body.access_token, "tok123");
    }

    #[test]
    fn error_body_detail_is_optional() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"bad password"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("bad password"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.detail.is_none());
    }

    #[test]
    fn send_request_serializes_content_and_room() {
        let req = SendMessageRequest { content: "hello", room: "general" };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"content": "hello", "room": "general"}));
    }
}
