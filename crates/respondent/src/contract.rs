use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Opaque request tag selected by the user from a fixed set.
///
/// The send pipeline carries this informationally and attaches no behavior to
/// it; interpretation is entirely the respondent's concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Default,
    Fast,
    Precise,
}

impl Mode {
    /// Every selectable mode, in display order.
    pub const ALL: [Mode; 3] = [Mode::Default, Mode::Fast, Mode::Precise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Fast => "fast",
            Self::Precise => "precise",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request across the respondent boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub prompt: String,
    pub mode: Mode,
}

impl ReplyRequest {
    pub fn new(prompt: impl Into<String>, mode: Mode) -> Self {
        Self {
            prompt: prompt.into(),
            mode,
        }
    }
}

/// Successful respondent resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "reply")]
    pub text: String,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type RespondentResult<T> = Result<T, RespondentError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RespondentError {
    #[snafu(display("missing API key for respondent '{respondent_id}'"))]
    MissingApiKey {
        stage: &'static str,
        respondent_id: String,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("completions failed on `{stage}`, {source}"))]
    CompletionsFailed {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
    #[snafu(display("respondent dropped the request on `{stage}` without resolving"))]
    Unresolved { stage: &'static str },
}

/// External collaborator that produces assistant replies given a prompt.
///
/// Resolves exactly once per request. The send pipeline performs no retries
/// and issues no second request before the first resolves, so implementors
/// never see overlapping calls from one session.
pub trait Respondent: Send + Sync {
    fn id(&self) -> &str;
    fn respond(&self, request: ReplyRequest) -> BoxFuture<'static, RespondentResult<Reply>>;
}
