//! Chat message entity.

use crate::domain::value_object::{ChatText, DisplayName, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub display_name: DisplayName,
    pub text: ChatText,
    pub sent_at: Timestamp,
}

impl ChatMessage {
    pub fn new(display_name: DisplayName, text: ChatText, sent_at: Timestamp) -> Self {
        Self {
            display_name,
            text,
            sent_at,
        }
    }
}
