//! Transcript types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assistant text appended when the backend could not answer.
pub const PLACEHOLDER_REPLY: &str = "Sorry, I can't answer right now.";

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered conversation of one session.
///
/// Turns are only ever appended; [`Transcript::restart`] is the single
/// operation that truncates. Timestamps never decrease: an append whose clock
/// reading is earlier than the last turn reuses the last timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// A transcript holding only the assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>, at: DateTime<Utc>) -> Self {
        let mut transcript = Self::default();
        transcript.push(TurnRole::Assistant, greeting.into(), at);
        transcript
    }

    /// Replaces every turn with a single assistant greeting.
    pub fn restart(&mut self, greeting: impl Into<String>, at: DateTime<Utc>) {
        self.turns.clear();
        self.push(TurnRole::Assistant, greeting.into(), at);
    }

    /// Appends the user's turn before the backend has answered.
    pub fn append_provisional(&mut self, content: impl Into<String>, at: DateTime<Utc>) -> &Turn {
        self.push(TurnRole::User, content.into(), at)
    }

    /// Appends the backend's reply to the pending user turn.
    pub fn append_confirmed(&mut self, content: impl Into<String>, at: DateTime<Utc>) -> &Turn {
        debug_assert!(self.is_awaiting_reply(), "reply without a pending user turn");
        self.push(TurnRole::Assistant, content.into(), at)
    }

    /// Appends the apologetic assistant turn used when the backend failed.
    pub fn append_placeholder(&mut self, at: DateTime<Utc>) -> &Turn {
        debug_assert!(self.is_awaiting_reply(), "reply without a pending user turn");
        self.push(TurnRole::Assistant, PLACEHOLDER_REPLY.to_string(), at)
    }

    /// True when the last turn is a user turn still waiting for its reply.
    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self.turns.last(), Some(turn) if turn.role == TurnRole::User)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    fn push(&mut self, role: TurnRole, content: String, at: DateTime<Utc>) -> &Turn {
        let timestamp = match self.turns.last() {
            Some(last) if last.timestamp > at => last.timestamp,
            _ => at,
        };
        self.turns.push(Turn {
            role,
            content,
            timestamp,
        });
        &self.turns[self.turns.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_greeting_is_first_turn() {
        let transcript = Transcript::with_greeting("Hello there", Utc::now());
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].role, TurnRole::Assistant);
        assert_eq!(transcript.turns()[0].content, "Hello there");
    }

    #[test]
    fn test_exchange_appends_in_order() {
        let now = Utc::now();
        let mut transcript = Transcript::with_greeting("Hi", now);
        transcript.append_provisional("How are you?", now);
        assert!(transcript.is_awaiting_reply());
        transcript.append_confirmed("Great!", now);
        assert!(!transcript.is_awaiting_reply());

        let roles: Vec<TurnRole> = transcript.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![TurnRole::Assistant, TurnRole::User, TurnRole::Assistant]
        );
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let now = Utc::now();
        let mut transcript = Transcript::with_greeting("Hi", now);
        let earlier = now - Duration::seconds(30);
        let turn = transcript.append_provisional("clock went back", earlier);
        assert_eq!(turn.timestamp, now);
    }

    #[test]
    fn test_restart_truncates_to_greeting() {
        let now = Utc::now();
        let mut transcript = Transcript::with_greeting("Hi", now);
        transcript.append_provisional("one", now);
        transcript.append_placeholder(now);
        transcript.restart("Hi again", now);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].content, "Hi again");
    }

    #[test]
    fn test_placeholder_text() {
        let mut transcript = Transcript::with_greeting("Hi", Utc::now());
        transcript.append_provisional("hello?", Utc::now());
        let turn = transcript.append_placeholder(Utc::now());
        assert_eq!(turn.content, PLACEHOLDER_REPLY);
        assert_eq!(turn.role, TurnRole::Assistant);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "reply without a pending user turn")]
    fn test_reply_requires_pending_user_turn() {
        let mut transcript = Transcript::with_greeting("Hi", Utc::now());
        transcript.append_confirmed("unprompted", Utc::now());
    }
}
