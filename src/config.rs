use std::env;

const API_BASE_ENV: &str = "CHATLINE_API_BASE";
const WS_BASE_ENV: &str = "CHATLINE_WS_BASE";

const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_WS_BASE: &str = "ws://localhost:8000";

/// The two base origins the client talks to, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub ws_base: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::resolve(env::var(API_BASE_ENV).ok(), env::var(WS_BASE_ENV).ok())
    }

    fn resolve(api_base: Option<String>, ws_base: Option<String>) -> Self {
        let api_base = api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let ws_base = ws_base.unwrap_or_else(|| DEFAULT_WS_BASE.to_string());
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            ws_base: to_ws_scheme(ws_base.trim_end_matches('/')),
        }
    }
}

/// Accepts an http(s) origin for the streaming side and rewrites it to its
/// ws(s) counterpart, so both variables may point at the same server.
fn to_ws_scheme(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_development() {
        let config = Config::resolve(None, None);
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.ws_base, "ws://localhost:8000");
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = Config::resolve(
            Some("https://chat.example.com/".to_string()),
            Some("wss://chat.example.com/".to_string()),
        );
        assert_eq!(config.api_base, "https://chat.example.com");
        assert_eq!(config.ws_base, "wss://chat.example.com");
    }

    #[test]
    fn http_origins_are_rewritten_for_the_socket() {
        assert_eq!(to_ws_scheme("http://localhost:8000"), "ws://localhost:8000");
        assert_eq!(to_ws_scheme("https://chat.example.com"), "wss://chat.example.com");
        assert_eq!(to_ws_scheme("ws://localhost:8000"), "ws://localhost:8000");
    }
}
