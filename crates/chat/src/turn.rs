use std::fmt;

use chrono::{DateTime, Local};
use uuid::Uuid;

/// Stable identifier for one turn, unique for the lifetime of the session.
///
/// UUID v7 combines a monotonic timestamp with random bits, so collisions
/// within one process are negligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(Uuid);

impl TurnId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Chat speaker role. Exactly three variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable message in the conversation.
///
/// Fields are private: once created a turn is never edited, and the log only
/// hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    id: TurnId,
    role: Role,
    content: String,
    created_at: DateTime<Local>,
}

impl Turn {
    /// Builds a well-formed turn with a fresh id and creation timestamp.
    ///
    /// Content is taken as-is; input validation belongs to the send pipeline.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: TurnId::generate(),
            role,
            content: content.into(),
            created_at: Local::now(),
        }
    }

    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Wall-clock label for transcript rendering. Never an ordering key.
    pub fn timestamp_label(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}
