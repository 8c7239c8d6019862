#![deny(unsafe_code)]

/// Respondent boundary contract shared with the chat core.
pub mod contract;
/// Deterministic respondents for tests and offline development.
pub mod mock;
/// rig-core backed respondent speaking to OpenAI-compatible endpoints.
pub mod rig_adapter;
/// Layered settings with atomic persistence.
pub mod settings;

pub use contract::{
    BoxFuture, Mode, Reply, ReplyRequest, Respondent, RespondentError, RespondentResult,
};
pub use rig_adapter::{DEFAULT_OPENAI_MODEL, RespondentConfig, RigRespondent};
pub use settings::{RespondentSettings, SettingsStore};
