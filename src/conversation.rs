//! Conversation store: the ordered list of turns the caller presents

use serde::{Deserialize, Serialize};

/// Who authored a turn. Serialized exactly as the service's wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One entry in a conversation, wire-identical to the service's history format.
///
/// A user turn's text is set once at creation and never mutated. A model
/// turn's text grows while its session streams and is frozen once the session
/// reaches a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Ordered sequence of turns, insertion order = chronological order.
///
/// The store is append-only apart from one bounded mutation: the text of the
/// most recently appended model turn may be replaced while a session streams
/// into it. Appending happens only through [`begin_exchange`], which adds the
/// user turn and its empty model placeholder together, so every user turn is
/// always immediately followed by exactly one model turn.
///
/// [`begin_exchange`]: Conversation::begin_exchange
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
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

    /// Clone the current turns for use as a request history snapshot.
    ///
    /// Called before [`begin_exchange`], so the snapshot never contains the
    /// in-flight exchange's own turns.
    ///
    /// [`begin_exchange`]: Conversation::begin_exchange
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Append a user turn and its empty model placeholder as one operation.
    pub(crate) fn begin_exchange(&mut self, text: &str) {
        self.turns.push(Turn::user(text));
        self.turns.push(Turn::model(""));
    }

    /// Replace the text of the most recently appended model turn.
    ///
    /// Returns false without mutating anything when the last turn is missing
    /// or not a model turn. No other turn is ever mutated.
    pub(crate) fn update_reply(&mut self, text: &str) -> bool {
        match self.turns.last_mut() {
            Some(turn) if turn.role == Role::Model => {
                turn.text = text.to_string();
                true
            }
            _ => false,
        }
    }
}
