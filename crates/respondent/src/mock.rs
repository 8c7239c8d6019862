use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::contract::{
    BoxFuture, Reply, ReplyRequest, Respondent, RespondentError, RespondentResult,
};

/// Respondent that resolves immediately from a canned script, in order.
///
/// Every request is recorded so tests can assert exactly how many calls the
/// pipeline issued and with what payload.
#[derive(Default)]
pub struct ScriptedRespondent {
    script: Mutex<VecDeque<RespondentResult<Reply>>>,
    requests: Mutex<Vec<ReplyRequest>>,
}

impl ScriptedRespondent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I>(replies: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let respondent = Self::new();
        for reply in replies {
            respondent.push_result(Ok(Reply::new(reply)));
        }
        respondent
    }

    pub fn push_result(&self, result: RespondentResult<Reply>) {
        self.script
            .lock()
            .expect("scripted respondent state poisoned")
            .push_back(result);
    }

    pub fn requests(&self) -> Vec<ReplyRequest> {
        self.requests
            .lock()
            .expect("scripted respondent state poisoned")
            .clone()
    }
}

impl Respondent for ScriptedRespondent {
    fn id(&self) -> &str {
        "scripted"
    }

    fn respond(&self, request: ReplyRequest) -> BoxFuture<'static, RespondentResult<Reply>> {
        self.requests
            .lock()
            .expect("scripted respondent state poisoned")
            .push(request);

        let next = self
            .script
            .lock()
            .expect("scripted respondent state poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(RespondentError::Unresolved {
                    stage: "scripted-script-exhausted",
                })
            });

        Box::pin(async move { next })
    }
}

/// Respondent whose requests stay pending until the caller releases them.
///
/// This is the collaborator for single-flight tests: a submission can be held
/// open while further submissions are attempted, then settled on demand.
#[derive(Default)]
pub struct ManualRespondent {
    pending: Mutex<VecDeque<oneshot::Sender<RespondentResult<Reply>>>>,
    requests: Mutex<Vec<ReplyRequest>>,
}

impl ManualRespondent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .expect("manual respondent state poisoned")
            .len()
    }

    /// Settles the oldest in-flight request. Returns false when none is
    /// pending or the requester already gave up on the reply.
    pub fn resolve_next(&self, result: RespondentResult<Reply>) -> bool {
        let sender = self
            .pending
            .lock()
            .expect("manual respondent state poisoned")
            .pop_front();

        sender.is_some_and(|sender| sender.send(result).is_ok())
    }

    pub fn resolve_with(&self, text: impl Into<String>) -> bool {
        self.resolve_next(Ok(Reply::new(text)))
    }

    pub fn requests(&self) -> Vec<ReplyRequest> {
        self.requests
            .lock()
            .expect("manual respondent state poisoned")
            .clone()
    }
}

impl Respondent for ManualRespondent {
    fn id(&self) -> &str {
        "manual"
    }

    fn respond(&self, request: ReplyRequest) -> BoxFuture<'static, RespondentResult<Reply>> {
        self.requests
            .lock()
            .expect("manual respondent state poisoned")
            .push(request);

        let (result_tx, result_rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("manual respondent state poisoned")
            .push_back(result_tx);

        Box::pin(async move {
            match result_rx.await {
                Ok(result) => result,
                Err(_) => Err(RespondentError::Unresolved {
                    stage: "manual-resolver-dropped",
                }),
            }
        })
    }
}
