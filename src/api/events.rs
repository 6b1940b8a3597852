use serde::Deserialize;

use crate::api::models::{self, Message};
use crate::utils;

/// One inbound event from the live socket.
///
/// The feed only ever pushes message events at us, but the type tag is kept
/// so anything else is dropped instead of misread.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub room: String,
    #[serde(default, deserialize_with = "models::opt_id_string")]
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

impl LiveFrame {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// A frame is delivered only when it is a message event for the room the
    /// client is currently in.
    pub fn accepts(&self, active_room: &str) -> bool {
        self.kind == "message" && self.room == active_room
    }

    /// Converts into a history entry, filling the fields the feed may omit:
    /// placeholder id, local receive time, anonymous user.
    pub fn into_message(self) -> Message {
        Message {
            id: self.id.unwrap_or_else(utils::temp_id),
            content: self.content,
            room: self.room,
            created_at: self.created_at.unwrap_or_else(utils::now_timestamp),
            user_id: self.user.unwrap_or_else(|| "anon".to_string()),
        }
    }
}
