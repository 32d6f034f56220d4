//! Chat widget state machine and message log.
//!
//! States: Closed (initial), Open+Maximized, Open+Minimized. Replies from the
//! assistant are produced on the tokio runtime and applied to the log when the
//! owner calls [`ChatSession::poll_replies`] or [`ChatSession::wait_for_reply`],
//! in completion order.

use crate::scroll_lock::{NoScrollLock, ScrollLockController};
use providers::Assistant;
use shared::chat::{ChatWidgetState, ConversationSession, Message, Sender};
use shared::settings::WidgetSettings;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Floating panel in the page corner
    Compact,
    /// Covers the whole viewport on narrow screens
    FullScreen,
}

#[derive(Debug)]
struct CompletedReply {
    request_id: u64,
    /// `None` when the assistant task died without answering
    text: Option<String>,
}

pub struct ChatSession {
    assistant: Arc<dyn Assistant>,
    runtime: Handle,
    scroll_lock: Box<dyn ScrollLockController>,
    lock_held: bool,

    state: ChatWidgetState,
    conversation: Option<ConversationSession>,
    messages: Vec<Message>,
    next_message_id: u64,

    next_request_id: u64,
    latest_request: Option<u64>,
    in_flight: HashSet<u64>,
    replies_tx: mpsc::UnboundedSender<CompletedReply>,
    replies_rx: mpsc::UnboundedReceiver<CompletedReply>,

    greeting: Option<String>,
    compact_min_width: f32,
    viewport: Option<Viewport>,
}

impl ChatSession {
    pub fn new(assistant: Arc<dyn Assistant>, runtime: Handle) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        let defaults = WidgetSettings::default();
        Self {
            assistant,
            runtime,
            scroll_lock: Box::new(NoScrollLock),
            lock_held: false,
            state: ChatWidgetState::default(),
            conversation: None,
            messages: Vec::new(),
            next_message_id: 1,
            next_request_id: 1,
            latest_request: None,
            in_flight: HashSet::new(),
            replies_tx,
            replies_rx,
            greeting: None,
            compact_min_width: defaults.compact_min_width,
            viewport: None,
        }
    }

    pub fn with_scroll_lock(mut self, scroll_lock: Box<dyn ScrollLockController>) -> Self {
        self.scroll_lock = scroll_lock;
        self
    }

    pub fn with_widget_settings(mut self, settings: &WidgetSettings) -> Self {
        self.greeting = settings
            .greeting
            .as_ref()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        self.compact_min_width = settings.compact_min_width;
        self
    }

    pub fn state(&self) -> &ChatWidgetState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn conversation(&self) -> Option<&ConversationSession> {
        self.conversation.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.conversation.as_ref().map(|c| c.session_id.as_str())
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn is_minimized(&self) -> bool {
        self.state.is_minimized
    }

    pub fn is_typing(&self) -> bool {
        self.state.is_typing
    }

    pub fn unread_count(&self) -> u32 {
        self.state.unread_count
    }

    /// Requests still waiting on the assistant
    pub fn pending_replies(&self) -> usize {
        self.in_flight.len()
    }

    // ---- transitions ----

    pub fn toggle(&mut self) {
        if self.state.is_open {
            self.state.is_open = false;
            self.state.is_minimized = false;
            debug!("Chat widget closed");
        } else {
            self.state.is_open = true;
            self.state.is_minimized = false;
            self.state.unread_count = 0;
            self.ensure_conversation();
            debug!(session_id = self.session_id().unwrap_or_default(), "Chat widget opened");
        }
        self.sync_scroll_lock();
    }

    pub fn minimize(&mut self) {
        if self.state.is_maximized() {
            self.state.is_minimized = true;
            self.sync_scroll_lock();
        }
    }

    pub fn maximize(&mut self) {
        if self.state.is_open && self.state.is_minimized {
            self.state.is_minimized = false;
            self.state.unread_count = 0;
            self.sync_scroll_lock();
        }
    }

    pub fn close(&mut self) {
        if self.state.is_open {
            self.toggle();
        }
    }

    // ---- input ----

    pub fn draft(&self) -> &str {
        &self.state.input_draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.state.input_draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.input_draft = text.into();
    }

    /// Submit whatever is in the input draft.
    pub fn submit_draft(&mut self) -> bool {
        let text = std::mem::take(&mut self.state.input_draft);
        let accepted = self.submit(&text);
        if !accepted {
            self.state.input_draft = text;
        }
        accepted
    }

    /// Append the user's message and ask the assistant for a reply.
    ///
    /// Returns `false` (and changes nothing) for blank input. Overlapping
    /// submissions are allowed; each reply is appended when it completes.
    pub fn submit(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        if let Some(conversation) = self.conversation.as_mut() {
            conversation.note_user_message(text);
        }
        self.push_message(Sender::User, text.to_string());
        self.state.input_draft.clear();

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight.insert(request_id);
        self.latest_request = Some(request_id);
        self.refresh_typing();

        let assistant = Arc::clone(&self.assistant);
        let tx = self.replies_tx.clone();
        let message = text.to_string();
        self.runtime.spawn(async move {
            let call = tokio::spawn(async move { assistant.send(&message).await });
            let text = match call.await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(request_id, error = %e, "Assistant task failed without a reply");
                    None
                }
            };
            // Receiver gone means the widget was unmounted
            let _ = tx.send(CompletedReply { request_id, text });
        });

        info!(request_id, chars = text.chars().count(), "Submitted chat message");
        true
    }

    // ---- replies ----

    /// Apply every reply that has already arrived. Never blocks.
    pub fn poll_replies(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(reply) = self.replies_rx.try_recv() {
            self.apply_reply(reply);
            applied += 1;
        }
        applied
    }

    /// Wait for the next reply and apply it. Returns `false` when nothing is
    /// outstanding.
    pub async fn wait_for_reply(&mut self) -> bool {
        if self.in_flight.is_empty() {
            return false;
        }
        match self.replies_rx.recv().await {
            Some(reply) => {
                self.apply_reply(reply);
                true
            }
            None => false,
        }
    }

    fn apply_reply(&mut self, reply: CompletedReply) {
        self.in_flight.remove(&reply.request_id);
        if let Some(text) = reply.text {
            self.push_message(Sender::Assistant, text);
            if !self.state.is_maximized() {
                self.state.unread_count += 1;
            }
        }
        self.refresh_typing();
        debug!(
            request_id = reply.request_id,
            unread = self.state.unread_count,
            "Assistant reply appended"
        );
    }

    // ---- viewport ----

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Some(Viewport { width, height });
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn presentation(&self) -> Presentation {
        match self.viewport {
            Some(v) if v.width < self.compact_min_width => Presentation::FullScreen,
            _ => Presentation::Compact,
        }
    }

    // ---- internals ----

    fn ensure_conversation(&mut self) {
        if self.conversation.is_some() {
            return;
        }
        let conversation = ConversationSession::new();
        info!(session_id = %conversation.session_id, "Started conversation");
        self.conversation = Some(conversation);
        if let Some(greeting) = self.greeting.clone() {
            self.push_message(Sender::Assistant, greeting);
        }
    }

    fn push_message(&mut self, sender: Sender, text: String) {
        let id = self.next_message_id;
        self.next_message_id += 1;
        debug!(id, sender = sender.as_str(), "Message appended");
        self.messages.push(Message::new(id, sender, text));
    }

    fn refresh_typing(&mut self) {
        self.state.is_typing = self
            .latest_request
            .is_some_and(|id| self.in_flight.contains(&id));
    }

    fn sync_scroll_lock(&mut self) {
        let wanted = self.state.is_maximized();
        if wanted && !self.lock_held {
            self.scroll_lock.acquire();
            self.lock_held = true;
        } else if !wanted && self.lock_held {
            self.scroll_lock.release();
            self.lock_held = false;
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if self.lock_held {
            self.scroll_lock.release();
            self.lock_held = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use providers::{AssistantClient, FallbackResponder};
    use std::time::Duration;

    /// Echoes the message; anything starting with "slow" takes longer.
    struct EchoAssistant;

    #[async_trait::async_trait]
    impl Assistant for EchoAssistant {
        async fn send(&self, message: &str) -> String {
            if message.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            format!("echo: {}", message)
        }
    }

    struct PanickingAssistant;

    #[async_trait::async_trait]
    impl Assistant for PanickingAssistant {
        async fn send(&self, _message: &str) -> String {
            panic!("assistant crashed");
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLock {
        events: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ScrollLockController for RecordingLock {
        fn acquire(&mut self) {
            self.events.lock().push("acquire");
        }
        fn release(&mut self) {
            self.events.lock().push("release");
        }
    }

    fn echo_session() -> ChatSession {
        ChatSession::new(Arc::new(EchoAssistant), Handle::current())
    }

    fn assistant_texts(session: &ChatSession) -> Vec<&str> {
        session
            .messages()
            .iter()
            .filter(|m| m.sender == Sender::Assistant)
            .map(|m| m.text.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let mut session = echo_session();
        session.toggle();

        assert!(!session.submit(""));
        assert!(!session.submit("   \n\t"));
        assert!(session.messages().is_empty());
        assert!(!session.is_typing());
        assert!(!session.wait_for_reply().await);
    }

    #[tokio::test]
    async fn test_fallback_reply_round_trip() {
        let client = AssistantClient::fallback_only();
        let mut session = ChatSession::new(Arc::new(client), Handle::current());
        session.toggle();

        assert!(session.submit("hello"));
        assert_eq!(session.messages().len(), 1);
        assert!(session.is_typing());

        assert!(session.wait_for_reply().await);
        assert!(!session.is_typing());

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].text, FallbackResponder::walletx().resolve("hello"));
        assert!(messages[0].id < messages[1].id);
    }

    #[tokio::test]
    async fn test_submit_draft_clears_input() {
        let mut session = echo_session();
        session.toggle();
        session.set_draft("what are the fees?");

        assert!(session.submit_draft());
        assert_eq!(session.draft(), "");
        assert_eq!(session.messages()[0].text, "what are the fees?");

        session.set_draft("   ");
        assert!(!session.submit_draft());
        assert_eq!(session.draft(), "   ");
    }

    #[tokio::test]
    async fn test_replies_append_in_completion_order() {
        let mut session = echo_session();
        session.toggle();

        session.submit("slow question");
        session.submit("fast question");
        assert_eq!(session.pending_replies(), 2);

        assert!(session.wait_for_reply().await);
        // The most recent request has been answered
        assert!(!session.is_typing());
        assert_eq!(session.pending_replies(), 1);

        assert!(session.wait_for_reply().await);
        assert_eq!(
            assistant_texts(&session),
            vec!["echo: fast question", "echo: slow question"]
        );
    }

    #[tokio::test]
    async fn test_crashed_assistant_task_clears_typing() {
        let mut session = ChatSession::new(Arc::new(PanickingAssistant), Handle::current());
        session.toggle();

        assert!(session.submit("hello"));
        assert!(session.is_typing());

        assert!(session.wait_for_reply().await);
        assert!(!session.is_typing());
        assert_eq!(session.pending_replies(), 0);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.unread_count(), 0);
        // Nothing left to wait for
        assert!(!session.wait_for_reply().await);
    }

    #[tokio::test]
    async fn test_typing_tracks_latest_request() {
        let mut session = echo_session();
        session.toggle();

        session.submit("fast one");
        session.submit("slow two");
        assert!(session.wait_for_reply().await);
        // "fast one" answered, "slow two" is still outstanding
        assert!(session.is_typing());
        assert!(session.wait_for_reply().await);
        assert!(!session.is_typing());
    }

    #[tokio::test]
    async fn test_unread_counts_while_minimized() {
        let mut session = echo_session();
        session.toggle();
        session.minimize();

        for i in 0..3 {
            session.submit(&format!("question {}", i));
        }
        while session.wait_for_reply().await {}
        assert_eq!(session.unread_count(), 3);

        session.maximize();
        assert_eq!(session.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_no_unread_while_maximized() {
        let mut session = echo_session();
        session.toggle();
        session.submit("hi");
        session.wait_for_reply().await;
        assert_eq!(session.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_reply_after_close_is_still_appended() {
        let mut session = echo_session();
        session.toggle();
        session.submit("slow reply please");
        session.close();
        assert!(!session.is_open());

        assert!(session.wait_for_reply().await);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.unread_count(), 1);

        session.toggle();
        assert_eq!(session.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_poll_replies_is_non_blocking() {
        let mut session = echo_session();
        session.toggle();
        assert_eq!(session.poll_replies(), 0);

        session.submit("slow");
        assert_eq!(session.poll_replies(), 0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(session.poll_replies(), 1);
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_conversation_created_lazily_and_kept() {
        let mut session = echo_session().with_widget_settings(&WidgetSettings::default());
        assert!(session.session_id().is_none());

        session.toggle();
        let id = session.session_id().map(str::to_string);
        assert!(id.is_some());
        // Greeting is the first message
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].sender, Sender::Assistant);

        session.toggle();
        session.toggle();
        assert_eq!(session.session_id().map(str::to_string), id);
        assert_eq!(session.messages().len(), 1);

        session.submit("How do I recover my wallet?");
        assert_eq!(
            session.conversation().map(|c| c.title.as_str()),
            Some("How do I recover my wallet?")
        );
    }

    #[tokio::test]
    async fn test_greeting_can_be_disabled() {
        let settings = WidgetSettings {
            greeting: None,
            ..WidgetSettings::default()
        };
        let mut session = echo_session().with_widget_settings(&settings);
        session.toggle();
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_transitions() {
        let mut session = echo_session();

        // Closed: minimize/maximize/close do nothing
        session.minimize();
        session.maximize();
        session.close();
        assert!(!session.is_open() && !session.is_minimized());

        session.toggle();
        assert!(session.is_open() && !session.is_minimized());

        session.minimize();
        assert!(session.is_open() && session.is_minimized());

        session.maximize();
        assert!(session.is_open() && !session.is_minimized());

        session.minimize();
        session.toggle();
        assert!(!session.is_open() && !session.is_minimized());

        session.toggle();
        session.minimize();
        session.close();
        assert!(!session.is_open() && !session.is_minimized());
    }

    #[tokio::test]
    async fn test_minimized_implies_open_for_all_sequences() {
        type Op = fn(&mut ChatSession);
        let ops: [Op; 4] = [
            ChatSession::toggle,
            ChatSession::minimize,
            ChatSession::maximize,
            ChatSession::close,
        ];

        // Every sequence of up to four operations
        for len in 1..=4u32 {
            for code in 0..4usize.pow(len) {
                let mut session = echo_session();
                let mut c = code;
                for _ in 0..len {
                    ops[c % 4](&mut session);
                    c /= 4;
                    assert!(!session.is_minimized() || session.is_open());
                    if session.state().is_maximized() {
                        assert_eq!(session.unread_count(), 0);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_scroll_lock_follows_maximized_state() {
        let lock = RecordingLock::default();
        let events = Arc::clone(&lock.events);
        let mut session = echo_session().with_scroll_lock(Box::new(lock));

        session.toggle();
        session.minimize();
        session.maximize();
        session.maximize();
        session.close();
        assert_eq!(
            *events.lock(),
            vec!["acquire", "release", "acquire", "release"]
        );

        session.toggle();
        drop(session);
        assert_eq!(events.lock().len(), 6);
        assert_eq!(events.lock().last(), Some(&"release"));
    }

    #[tokio::test]
    async fn test_presentation_follows_viewport() {
        let mut session = echo_session();
        assert_eq!(session.presentation(), Presentation::Compact);

        session.set_viewport(390.0, 844.0);
        assert_eq!(session.presentation(), Presentation::FullScreen);
        assert_eq!(
            session.viewport(),
            Some(Viewport {
                width: 390.0,
                height: 844.0
            })
        );

        session.set_viewport(1280.0, 800.0);
        assert_eq!(session.presentation(), Presentation::Compact);
    }
}
