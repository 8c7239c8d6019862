#![deny(unsafe_code)]

/// Ordered, append-only conversation log.
pub mod conversation;
/// Session object driving the request/response cycle.
pub mod session;
/// Send pipeline state machine.
pub mod state;
/// Turn model and identifier generation.
pub mod turn;
/// Transcript follow contract for the rendering layer.
pub mod view_sync;

pub use conversation::Conversation;
pub use session::{ChatSession, DEFAULT_REQUEST_TIMEOUT, ReplyOutcome, SubmitOutcome};
pub use state::{SendRejection, SendState, SendTransition};
pub use turn::{Role, Turn, TurnId};
pub use view_sync::{TailFollower, ViewSync};
