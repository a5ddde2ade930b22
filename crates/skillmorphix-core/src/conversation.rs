//! Chat session with the study assistant
//!
//! A [`Conversation`] lives while the chat screen is open. Sending a message
//! schedules the assistant's reply on the injected [`Clock`]; [`Conversation::poll`]
//! delivers whatever has come due.

use crate::clock::Clock;
use crate::responder::{self, Reply};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const MATH_WELCOME: &str = "Hello! I'm your Mathematics AI Tutor. I can help with concepts, solve problems step-by-step, or explain mathematical theories. What would you like to learn about today?";
pub const GENERAL_WELCOME: &str = "Hello! I'm your Skillmorphix AI Learning Assistant. How can I help with your studies today?";

/// Simulated typing time before a reply shows up
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// A message in the chat transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        let prefix = match role {
            ChatRole::User => "user",
            ChatRole::Assistant => "ai",
        };
        Self {
            id: format!("{}-{}", prefix, uuid::Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }
}

/// True when a navigation hint asks for the mathematics tutor.
pub fn is_math_context(hint: &str) -> bool {
    hint.to_lowercase().contains("math")
}

#[derive(Debug)]
struct PendingReply {
    due: Instant,
    reply: Reply,
}

pub struct Conversation {
    messages: Vec<ChatMessage>,
    math_focused: bool,
    pending: VecDeque<PendingReply>,
    reply_delay: Duration,
    clock: Arc<dyn Clock>,
}

impl Conversation {
    /// Start a conversation seeded with the welcome message for `context_hint`.
    pub fn new(context_hint: Option<&str>, reply_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        let math_focused = context_hint.is_some_and(is_math_context);
        let welcome = if math_focused { MATH_WELCOME } else { GENERAL_WELCOME };
        let messages = vec![ChatMessage::new(
            ChatRole::Assistant,
            welcome,
            clock.local_time(),
        )];

        tracing::info!(math_focused, "conversation started");

        Self {
            messages,
            math_focused,
            pending: VecDeque::new(),
            reply_delay,
            clock,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_math_focused(&self) -> bool {
        self.math_focused
    }

    pub fn is_awaiting_reply(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the oldest pending reply comes due, if any
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|p| p.due)
    }

    /// Append the user's message and schedule the assistant's reply.
    ///
    /// Blank input is ignored and returns `false`. The reply is chosen against
    /// the focus flag at send time; its focus change lands on delivery.
    pub fn send(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        self.messages
            .push(ChatMessage::new(ChatRole::User, text, self.clock.local_time()));

        let reply = responder::respond(text, self.math_focused);
        let due = self.clock.now() + self.reply_delay;
        self.pending.push_back(PendingReply { due, reply });

        tracing::debug!(pending = self.pending.len(), "reply scheduled");
        true
    }

    /// Deliver every reply that has come due. Returns how many were delivered.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut delivered = 0;

        while self.pending.front().is_some_and(|p| p.due <= now) {
            let Some(PendingReply { reply, .. }) = self.pending.pop_front() else {
                break;
            };
            self.math_focused |= reply.math_focused;
            self.messages.push(ChatMessage::new(
                ChatRole::Assistant,
                reply.text,
                self.clock.local_time(),
            ));
            delivered += 1;
        }

        if delivered > 0 {
            tracing::debug!(delivered, math_focused = self.math_focused, "replies delivered");
        }
        delivered
    }

    /// Screen title for the current focus
    pub fn title(&self) -> &'static str {
        if self.math_focused {
            "Mathematics Tutor"
        } else {
            "Learning Assistant"
        }
    }

    pub fn subtitle(&self) -> &'static str {
        if self.math_focused {
            "Get help with mathematics concepts, problem-solving, and more"
        } else {
            "Ask questions about your coursework and get instant help"
        }
    }

    pub fn placeholder(&self) -> &'static str {
        if self.math_focused {
            "Ask about any math concept or problem..."
        } else {
            "Type your question here..."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::responder::DEFAULT_REPLY;
    use proptest::prelude::*;

    fn conversation(hint: Option<&str>) -> (Conversation, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let conv = Conversation::new(hint, DEFAULT_REPLY_DELAY, clock.clone());
        (conv, clock)
    }

    #[test]
    fn test_starts_with_single_welcome() {
        let (conv, _) = conversation(None);
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].content, GENERAL_WELCOME);
        assert!(!conv.messages()[0].is_user());
        assert!(!conv.is_math_focused());
        assert!(!conv.is_awaiting_reply());
    }

    #[test]
    fn test_math_hint_starts_focused() {
        let (conv, _) = conversation(Some("Mathematics videos"));
        assert!(conv.is_math_focused());
        assert_eq!(conv.messages()[0].content, MATH_WELCOME);
        assert_eq!(conv.title(), "Mathematics Tutor");
    }

    #[test]
    fn test_non_math_hint_stays_general() {
        let (conv, _) = conversation(Some("Introduction to Fractions"));
        assert!(!conv.is_math_focused());
        assert_eq!(conv.messages()[0].content, GENERAL_WELCOME);
    }

    #[test]
    fn test_reply_waits_for_delay() {
        let (mut conv, clock) = conversation(None);
        assert!(conv.send("hello"));
        assert_eq!(conv.messages().len(), 2);
        assert!(conv.messages()[1].is_user());
        assert!(conv.is_awaiting_reply());

        clock.advance(Duration::from_millis(999));
        assert_eq!(conv.poll(), 0);
        assert!(conv.is_awaiting_reply());

        clock.advance(Duration::from_millis(1));
        assert_eq!(conv.poll(), 1);
        assert!(!conv.is_awaiting_reply());
        let last = conv.messages().last().unwrap();
        assert_eq!(last.content, "Hello! How can I help with your learning today?");
        assert_eq!(last.role, ChatRole::Assistant);
    }

    #[test]
    fn test_zero_delay_delivers_on_next_poll() {
        let clock = Arc::new(ManualClock::new());
        let mut conv = Conversation::new(None, Duration::ZERO, clock);
        conv.send("homework");
        assert_eq!(conv.poll(), 1);
        assert_eq!(conv.messages().len(), 3);
    }

    #[test]
    fn test_blank_input_ignored() {
        let (mut conv, _) = conversation(None);
        assert!(!conv.send(""));
        assert!(!conv.send("   \t"));
        assert_eq!(conv.messages().len(), 1);
        assert!(!conv.is_awaiting_reply());
    }

    #[test]
    fn test_focus_changes_on_delivery() {
        let (mut conv, clock) = conversation(None);
        conv.send("I need help with algebra");
        assert!(!conv.is_math_focused());

        clock.advance(DEFAULT_REPLY_DELAY);
        conv.poll();
        assert!(conv.is_math_focused());
        assert_eq!(conv.placeholder(), "Ask about any math concept or problem...");

        // unrelated follow-up stays on the math table
        conv.send("what is a percentage");
        clock.advance(DEFAULT_REPLY_DELAY);
        conv.poll();
        assert!(conv.messages().last().unwrap().content.starts_with("A percentage is"));
        assert!(conv.is_math_focused());
    }

    #[test]
    fn test_overlapping_sends_use_focus_at_send_time() {
        let (mut conv, clock) = conversation(None);
        conv.send("algebra please");
        conv.send("hello");
        clock.advance(DEFAULT_REPLY_DELAY);
        assert_eq!(conv.poll(), 2);

        let replies: Vec<&str> = conv.messages()[3..].iter().map(|m| m.content.as_str()).collect();
        assert!(replies[0].starts_with("Algebra uses symbols"));
        assert_eq!(replies[1], "Hello! How can I help with your learning today?");
        assert!(conv.is_math_focused());
    }

    #[test]
    fn test_replies_keep_send_order() {
        let (mut conv, clock) = conversation(None);
        conv.send("hi");
        clock.advance(Duration::from_millis(400));
        conv.send("test");
        assert_eq!(conv.next_due(), Some(clock.now() + Duration::from_millis(600)));

        clock.advance(Duration::from_millis(600));
        assert_eq!(conv.poll(), 1);
        clock.advance(Duration::from_millis(400));
        assert_eq!(conv.poll(), 1);

        let roles: Vec<bool> = conv.messages().iter().map(ChatMessage::is_user).collect();
        assert_eq!(roles, vec![false, true, true, false, false]);
    }

    #[test]
    fn test_unknown_question_gets_default() {
        let (mut conv, clock) = conversation(None);
        conv.send("Can you explain the pythagorean theorem?");
        clock.advance(DEFAULT_REPLY_DELAY);
        conv.poll();
        assert_eq!(conv.messages().last().unwrap().content, DEFAULT_REPLY);
        assert!(!conv.is_math_focused());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let (mut conv, clock) = conversation(None);
        for text in ["hi", "help", "test"] {
            conv.send(text);
        }
        clock.advance(DEFAULT_REPLY_DELAY);
        conv.poll();

        let mut ids: Vec<&str> = conv.messages().iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    proptest! {
        #[test]
        fn prop_focus_is_monotonic(utterances in proptest::collection::vec("[a-z ]{0,30}", 1..12)) {
            let (mut conv, clock) = conversation(None);
            let mut was_focused = false;
            for text in &utterances {
                conv.send(text);
                clock.advance(DEFAULT_REPLY_DELAY);
                conv.poll();
                if was_focused {
                    prop_assert!(conv.is_math_focused());
                }
                was_focused = conv.is_math_focused();
            }
        }

        #[test]
        fn prop_every_send_gets_one_reply(utterances in proptest::collection::vec("[a-zA-Z ]{1,30}", 0..10)) {
            let (mut conv, clock) = conversation(None);
            let sent = utterances.iter().filter(|u| conv.send(u)).count();
            clock.advance(DEFAULT_REPLY_DELAY);
            prop_assert_eq!(conv.poll(), sent);
            prop_assert_eq!(conv.messages().len(), 1 + 2 * sent);
            prop_assert!(!conv.is_awaiting_reply());
        }
    }
}
