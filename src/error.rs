use thiserror::Error;

/// Failures a client operation can surface to the user.
///
/// Everything here collapses into the single transient error line the
/// frontend shows; socket-level failures never appear because they only
/// drive the reconnect loop in [`crate::live`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Registration or login failed. Carries the server-provided detail
    /// when the response had one, otherwise a status-derived message.
    #[error("{0}")]
    Auth(String),

    /// History load failed with a non-success status.
    #[error("failed to fetch messages: {0}")]
    Fetch(reqwest::StatusCode),

    /// Message submission failed with a non-success status.
    #[error("send failed: {0}")]
    Send(reqwest::StatusCode),

    /// The configured websocket origin does not form a valid endpoint.
    #[error("bad endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Transport-level failure talking to the HTTP API.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_displays_server_detail_verbatim() {
        let err = ClientError::Auth("invalid credentials".to_string());
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn fetch_and_send_carry_the_status() {
        let err = ClientError::Fetch(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "failed to fetch messages: 500 Internal Server Error");

        let err = ClientError::Send(reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "send failed: 401 Unauthorized");
    }
}
