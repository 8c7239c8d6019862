use std::sync::Arc;
use std::time::Duration;

use confab_respondent::{BoxFuture, Mode, Reply, ReplyRequest, Respondent, RespondentResult};

use crate::conversation::Conversation;
use crate::state::{SendState, SendTransition};
use crate::turn::{Role, Turn};
use crate::view_sync::ViewSync;

/// Default ceiling on one respondent round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What `submit` did with the input.
///
/// Rejections are silent no-ops by design: no turn is created, no request is
/// issued, and nothing is surfaced to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// User turn appended and exactly one respondent request issued.
    Accepted,
    /// Input was empty after trimming.
    RejectedEmpty,
    /// A respondent call is already outstanding.
    RejectedBusy,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// How one pending cycle settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Assistant turn appended from the respondent's reply.
    Replied,
    /// Respondent failed or timed out; a system notice turn was appended
    /// and the session returned to idle.
    Failed { notice: String },
    /// No request was outstanding.
    NothingPending,
}

struct PendingReply {
    prompt: String,
    outcome: BoxFuture<'static, RespondentResult<Reply>>,
}

/// One conversation's session: the exclusive owner of the log and the send
/// state.
///
/// All mutation flows through `submit` and `await_reply`; no other component
/// appends turns directly. `submit` performs its transition and append
/// synchronously; the only suspension point is the respondent boundary inside
/// `await_reply`, so transitions can never interleave.
pub struct ChatSession {
    conversation: Conversation,
    state: SendState,
    draft: String,
    mode: Mode,
    respondent: Arc<dyn Respondent>,
    pending: Option<PendingReply>,
    request_timeout: Duration,
    view_sync: Option<Box<dyn ViewSync + Send>>,
}

impl ChatSession {
    /// Creates a session over a freshly seeded conversation.
    pub fn new(respondent: Arc<dyn Respondent>) -> Self {
        Self {
            conversation: Conversation::seeded(),
            state: SendState::Idle,
            draft: String::new(),
            mode: Mode::Default,
            respondent,
            pending: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            view_sync: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_view_sync(mut self, view_sync: Box<dyn ViewSync + Send>) -> Self {
        self.view_sync = Some(view_sync);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    /// Typing-indicator signal, derived from the send state and nothing else.
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Prompt of the outstanding request, while one is outstanding.
    pub fn pending_prompt(&self) -> Option<&str> {
        self.pending.as_ref().map(|pending| pending.prompt.as_str())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Selects the tag carried on subsequent requests. Purely informational
    /// for the pipeline; the respondent decides what it means.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Submits the draft buffer in place of explicit text.
    pub fn submit_draft(&mut self) -> SubmitOutcome {
        let draft = std::mem::take(&mut self.draft);
        let outcome = self.submit(&draft);
        if !outcome.is_accepted() {
            // Keep rejected text so an in-progress draft is never lost.
            self.draft = draft;
        }
        outcome
    }

    /// Drives `Idle -> AwaitingResponse` for one user turn.
    ///
    /// Preconditions: input is non-empty after trimming and no request is
    /// outstanding. A failed precondition is a no-op, which is the mechanism
    /// that rejects whitespace-only input and prevents concurrent sends.
    pub fn submit(&mut self, raw_text: &str) -> SubmitOutcome {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            tracing::debug!("dropping whitespace-only submission");
            return SubmitOutcome::RejectedEmpty;
        }

        let Ok(next_state) = self.state.apply(SendTransition::Begin) else {
            tracing::debug!("dropping submission while a request is outstanding");
            return SubmitOutcome::RejectedBusy;
        };

        let prompt = trimmed.to_string();
        self.append(Turn::new(Role::User, prompt.clone()));
        self.draft.clear();
        self.state = next_state;

        tracing::debug!(
            respondent_id = %self.respondent.id(),
            mode = %self.mode,
            prompt_len = prompt.len(),
            "issuing respondent request"
        );
        let outcome = self
            .respondent
            .respond(ReplyRequest::new(prompt.clone(), self.mode));
        self.pending = Some(PendingReply { prompt, outcome });

        SubmitOutcome::Accepted
    }

    /// Resolves the outstanding respondent call and drives
    /// `AwaitingResponse -> Idle`.
    ///
    /// Failures and timeouts never escape to the caller: both settle the
    /// state machine back to idle and append a visible system notice turn in
    /// place of the reply.
    pub async fn await_reply(&mut self) -> ReplyOutcome {
        let Some(pending) = self.pending.take() else {
            // An earlier resolution future may have been dropped after taking
            // the pending request; settle the leftover awaiting state instead
            // of wedging the session.
            if let Ok(next_state) = self.state.apply(SendTransition::Settle) {
                self.state = next_state;
            }
            return ReplyOutcome::NothingPending;
        };

        let settled = match tokio::time::timeout(self.request_timeout, pending.outcome).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(error)) => Err(error.to_string()),
            Err(_elapsed) => Err(format!(
                "no reply within {} seconds",
                self.request_timeout.as_secs()
            )),
        };

        if let Ok(next_state) = self.state.apply(SendTransition::Settle) {
            self.state = next_state;
        }

        match settled {
            Ok(reply) => {
                self.append(Turn::new(Role::Assistant, reply.text));
                ReplyOutcome::Replied
            }
            Err(message) => {
                tracing::warn!(
                    respondent_id = %self.respondent.id(),
                    prompt_len = pending.prompt.len(),
                    error = %message,
                    "respondent call failed"
                );
                let notice = format!("The assistant could not reply: {message}");
                self.append(Turn::new(Role::System, notice.clone()));
                ReplyOutcome::Failed { notice }
            }
        }
    }

    fn append(&mut self, turn: Turn) {
        self.conversation.push(turn);
        if let Some(view_sync) = self.view_sync.as_mut() {
            view_sync.conversation_extended(&self.conversation);
        }
    }
}

#[cfg(test)]
mod tests {
    use confab_respondent::mock::{ManualRespondent, ScriptedRespondent};

    use super::*;

    #[test]
    fn whitespace_submissions_change_nothing() {
        let respondent = Arc::new(ScriptedRespondent::new());
        let mut session = ChatSession::new(respondent.clone());
        let before = session.conversation().clone();

        for input in ["", "   ", "\n\t"] {
            assert_eq!(session.submit(input), SubmitOutcome::RejectedEmpty);
        }

        assert_eq!(session.conversation(), &before);
        assert_eq!(session.state(), SendState::Idle);
        assert!(respondent.requests().is_empty());
    }

    #[test]
    fn accepted_submit_trims_and_clears_the_draft() {
        let respondent = Arc::new(ManualRespondent::new());
        let mut session = ChatSession::new(respondent.clone());
        session.set_draft("  hello  ");

        assert_eq!(session.submit_draft(), SubmitOutcome::Accepted);
        assert_eq!(session.draft(), "");
        assert_eq!(session.conversation().last().map(Turn::content), Some("hello"));
        assert_eq!(session.pending_prompt(), Some("hello"));
        assert_eq!(respondent.requests()[0].prompt, "hello");
    }

    #[test]
    fn rejected_draft_submission_keeps_the_draft() {
        let respondent = Arc::new(ManualRespondent::new());
        let mut session = ChatSession::new(respondent);
        session.set_draft("first");
        assert!(session.submit_draft().is_accepted());

        session.set_draft("second");
        assert_eq!(session.submit_draft(), SubmitOutcome::RejectedBusy);
        assert_eq!(session.draft(), "second");
    }

    #[tokio::test]
    async fn await_reply_without_pending_is_a_noop() {
        let respondent = Arc::new(ScriptedRespondent::new());
        let mut session = ChatSession::new(respondent);
        assert_eq!(session.await_reply().await, ReplyOutcome::NothingPending);
        assert_eq!(session.state(), SendState::Idle);
    }

    #[tokio::test]
    async fn abandoned_resolution_settles_back_to_idle() {
        let respondent = Arc::new(ManualRespondent::new());
        let mut session = ChatSession::new(respondent);
        assert!(session.submit("hello").is_accepted());

        // An outer deadline drops the resolution future after it has taken
        // the pending request but before the respondent settles.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), session.await_reply()).await;
        assert!(abandoned.is_err());

        assert_eq!(session.await_reply().await, ReplyOutcome::NothingPending);
        assert_eq!(session.state(), SendState::Idle);
        assert!(session.submit("again").is_accepted());
    }

    #[tokio::test]
    async fn timeout_settles_back_to_idle_with_a_notice() {
        let respondent = Arc::new(ManualRespondent::new());
        let mut session = ChatSession::new(respondent.clone())
            .with_request_timeout(Duration::from_millis(20));

        assert!(session.submit("hello").is_accepted());
        let outcome = session.await_reply().await;

        assert!(matches!(outcome, ReplyOutcome::Failed { .. }));
        assert_eq!(session.state(), SendState::Idle);
        let last = session.conversation().last().expect("notice turn");
        assert_eq!(last.role(), Role::System);
        assert!(last.content().starts_with("The assistant could not reply:"));
        // The held request is still the respondent's to drop.
        assert_eq!(respondent.pending_count(), 1);
    }
}
