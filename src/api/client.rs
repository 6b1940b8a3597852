use reqwest::Client as HttpClient;

use crate::api::models::{
    ErrorBody, LoginRequest, LoginResponse, Message, RegisterRequest, SendMessageRequest,
};
use crate::error::ClientError;

/// How many messages a history fetch asks for.
pub const DEFAULT_LIMIT: usize = 50;

/// HTTP half of the client. Holds the base origin and a pooled connection.
pub struct ApiClient {
    http: HttpClient,
    api_base: String,
}

impl ApiClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            http: HttpClient::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Creates an account. The caller is expected to follow up with a login
    /// using the same credentials.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.endpoint("/auth/register"))
            .json(&RegisterRequest { username, email, password })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            let detail = if detail.is_empty() {
                format!("registration failed: {status}")
            } else {
                detail
            };
            return Err(ClientError::Auth(detail));
        }
        Ok(())
    }

    /// Exchanges credentials for a bearer token. Failure surfaces the
    /// server's `detail` message when the body carries one.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let resp = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("login failed: {status}"));
            return Err(ClientError::Auth(detail));
        }
        let body: LoginResponse = resp.json().await?;
        Ok(body.access_token)
    }

    /// Loads the most recent messages for a room, in server order.
    pub async fn fetch_messages(
        &self,
        room: &str,
        limit: usize,
    ) -> Result<Vec<Message>, ClientError> {
        let resp = self
            .http
            .get(self.endpoint("/messages"))
            .query(&[("room", room), ("limit", &limit.to_string())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::Fetch(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// Submits a message and returns the created entry for the optimistic
    /// append.
    pub async fn send_message(
        &self,
        token: &str,
        room: &str,
        content: &str,
    ) -> Result<Message, ClientError> {
        let resp = self
            .http
            .post(self.endpoint("/messages"))
            .header("Authorization", format!("Bearer {token}"))
            .json(&SendMessageRequest { content, room })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::Send(resp.status()));
        }
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_origin_loses_its_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.endpoint("/messages"), "http://localhost:8000/messages");
    }
}
