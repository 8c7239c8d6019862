use crate::turn::{Role, Turn};

/// Session framing shown before any user interaction.
pub const SEED_FRAMING: &str =
    "You are chatting with an AI agent. Ask anything about your product, users, or data.";

/// Assistant greeting shown before any user interaction.
pub const SEED_GREETING: &str =
    "Hey, I’m ready when you are. Tell me what you’re working on and I’ll help you break it down.";

/// Ordered, append-only log of turns for one session.
///
/// Insertion order is both storage order and display order; there is no
/// separate sort key, and no turn is ever edited or removed once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Creates the seeded opening state: one system framing turn followed by
    /// one assistant greeting.
    pub fn seeded() -> Self {
        let mut conversation = Self::empty();
        conversation.push(Turn::new(Role::System, SEED_FRAMING));
        conversation.push(Turn::new(Role::Assistant, SEED_GREETING));
        conversation
    }

    /// Creates an empty log, for callers composing their own opening.
    pub fn empty() -> Self {
        Self { turns: Vec::new() }
    }

    /// Appends strictly after all existing turns. Never reorders, never
    /// deduplicates.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
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
}

impl Default for Conversation {
    fn default() -> Self {
        Self::seeded()
    }
}
