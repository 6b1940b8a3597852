use crate::api::models::Message;

/// The authenticated identity of the client: a bearer token, present or
/// absent. "Logged in" means exactly `token.is_some()`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

/// The in-memory view the frontend renders: one active room, its append-only
/// message history, the staged input draft, and a single transient error
/// line. No I/O happens here; the frontend calls in with results.
#[derive(Debug, Default)]
pub struct ChatState {
    room: String,
    messages: Vec<Message>,
    draft: String,
    error: Option<String>,
}

impl ChatState {
    pub fn new(room: impl Into<String>) -> Self {
        Self { room: room.into(), ..Self::default() }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Wholesale replacement from a history fetch, preserving server order.
    /// The result is discarded when it was issued for a room that is no
    /// longer active, so a slow response cannot clobber another room's view.
    pub fn replace_history(&mut self, fetched_for: &str, messages: Vec<Message>) -> bool {
        if fetched_for != self.room {
            return false;
        }
        self.messages = messages;
        true
    }

    /// Appends one message, gated on the active room. The gate also covers
    /// frames a previous subscription delivered just before teardown.
    pub fn append(&mut self, message: Message) -> bool {
        if message.room != self.room {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Switching rooms discards the in-memory history; the caller refetches
    /// and resubscribes.
    pub fn switch_room(&mut self, room: impl Into<String>) {
        self.room = room.into();
        self.messages.clear();
    }

    /// Full reset on logout: history, draft and error all go.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.draft.clear();
        self.error = None;
    }

    /// Stages input for submission. Returns false for whitespace-only
    /// content, which must never reach the network.
    pub fn stage_draft(&mut self, content: impl Into<String>) -> bool {
        self.draft = content.into();
        !self.draft.trim().is_empty()
    }

    /// The staged content, exactly as typed.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Cleared only after a successful send; a failed send keeps the draft.
    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Overwrites the transient error line; there is no error log.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn msg(id: &str, room: &str, content: &str) -> Message {
        Message {
            id: id.to_string(),
            content: content.to_string(),
            room: room.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            user_id: "bob".to_string(),
        }
    }

    #[test]
    fn token_presence_is_the_authenticated_predicate() {
        let mut session = Session::new(None);
        assert!(!session.authenticated());

        session.set_token("tok123".to_string());
        assert!(session.authenticated());
        assert_eq!(session.token(), Some("tok123"));

        session.clear();
        assert!(!session.authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn fetch_replaces_history_wholesale() {
        let mut chat = ChatState::new("global");
        chat.append(msg("1", "global", "old"));

        let replaced =
            chat.replace_history("global", vec![msg("2", "global", "hi")]);
        assert!(replaced);
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].id, "2");
        assert_eq!(chat.messages()[0].content, "hi");
    }

    #[test]
    fn stale_fetch_for_a_previous_room_is_discarded() {
        let mut chat = ChatState::new("global");
        chat.switch_room("general");
        chat.append(msg("1", "general", "fresh"));

        let replaced = chat.replace_history("global", vec![msg("9", "global", "stale")]);
        assert!(!replaced);
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].id, "1");
    }

    #[test]
    fn off_room_append_leaves_history_unchanged() {
        let mut chat = ChatState::new("general");
        chat.replace_history("general", vec![msg("1", "general", "hi")]);

        assert!(!chat.append(msg("2", "random", "x")));
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn switching_rooms_discards_history() {
        let mut chat = ChatState::new("global");
        chat.append(msg("1", "global", "hi"));

        chat.switch_room("general");
        assert_eq!(chat.room(), "general");
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut chat = ChatState::new("global");
        chat.append(msg("1", "global", "hi"));
        chat.stage_draft("half-typed");
        chat.set_error("send failed: 500");

        chat.reset();
        assert!(chat.messages().is_empty());
        assert!(chat.draft().is_empty());
        assert!(chat.error().is_none());
    }

    #[test]
    fn whitespace_only_draft_is_not_ready() {
        let mut chat = ChatState::new("global");
        assert!(!chat.stage_draft(""));
        assert!(!chat.stage_draft("   \t  "));
        assert!(chat.stage_draft("  hi  "));
        assert_eq!(chat.draft(), "  hi  ");
    }

    #[test]
    fn errors_overwrite_instead_of_accumulating() {
        let mut chat = ChatState::new("global");
        chat.set_error("first");
        chat.set_error("second");
        assert_eq!(chat.error(), Some("second"));

        chat.clear_error();
        assert!(chat.error().is_none());
    }

    proptest! {
        /// No sequence of appends ever lands an off-room message in history.
        #[test]
        fn history_only_ever_holds_the_active_room(
            rooms in proptest::collection::vec("(general|random|global)", 0..40),
        ) {
            let mut chat = ChatState::new("general");
            for (i, room) in rooms.iter().enumerate() {
                chat.append(msg(&i.to_string(), room, "x"));
            }
            prop_assert!(chat.messages().iter().all(|m| m.room == "general"));
        }

        /// However fetch and live delivery interleave, the final view is the
        /// fetched history followed by every frame that arrived after it.
        #[test]
        fn post_fetch_frames_are_never_lost(
            before in 0usize..5,
            after in 0usize..5,
        ) {
            let mut chat = ChatState::new("general");
            for i in 0..before {
                chat.append(msg(&format!("live-early-{i}"), "general", "x"));
            }

            let fetched: Vec<Message> =
                (0..3).map(|i| msg(&format!("hist-{i}"), "general", "h")).collect();
            chat.replace_history("general", fetched.clone());

            for i in 0..after {
                chat.append(msg(&format!("live-late-{i}"), "general", "x"));
            }

            // Superset of the fetch result, with late arrivals appended in order.
            prop_assert_eq!(chat.messages().len(), fetched.len() + after);
            for (i, m) in fetched.iter().enumerate() {
                prop_assert_eq!(&chat.messages()[i].id, &m.id);
            }
            for i in 0..after {
                let got = &chat.messages()[fetched.len() + i].id;
                prop_assert_eq!(got, &format!("live-late-{i}"));
            }
        }
    }
}
