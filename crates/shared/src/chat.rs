//! Conversation types shared between the assistant client and the chat widget.
//!
//! Everything here lives only as long as the mounted widget; nothing is
//! written to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const UNTITLED: &str = "New conversation";
const TITLE_CHARS: usize = 40;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// A single entry in the message log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Monotonic within a session, starting at 1
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: u64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Short clock time for display next to the bubble
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Identifies one continuous widget-open period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            title: UNTITLED.to_string(),
        }
    }

    pub fn has_title(&self) -> bool {
        self.title != UNTITLED
    }

    /// Name the conversation after the first thing the user asked.
    pub fn note_user_message(&mut self, text: &str) {
        if self.has_title() {
            return;
        }
        let trimmed = text.trim();
        let mut title: String = trimmed.chars().take(TITLE_CHARS).collect();
        title = title.trim_end().to_string();
        if trimmed.chars().count() > TITLE_CHARS {
            title.push_str("...");
        }
        if !title.is_empty() {
            self.title = title;
        }
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient UI state of the floating widget.
///
/// `is_minimized` implies `is_open`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatWidgetState {
    pub is_open: bool,
    pub is_minimized: bool,
    pub unread_count: u32,
    pub is_typing: bool,
    pub input_draft: String,
}

impl ChatWidgetState {
    /// Open and showing the full conversation
    pub fn is_maximized(&self) -> bool {
        self.is_open && !self.is_minimized
    }
}
