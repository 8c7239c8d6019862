/// Send pipeline lifecycle for one conversation.
///
/// `Idle` accepts user input; `AwaitingResponse` means exactly one respondent
/// call is outstanding. There is no separate pending flag to keep in sync:
/// the typing indicator derives from this state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// State transition input for the request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendTransition {
    /// A user turn was accepted and a respondent request issued.
    Begin,
    /// The outstanding respondent call resolved, successfully or not.
    Settle,
}

/// Rejection reason for illegal send transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    RequestInFlight,
    NoRequestInFlight,
}

pub type SendTransitionResult = Result<SendState, SendRejection>;

impl SendState {
    /// True while a respondent call is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::AwaitingResponse)
    }

    /// Applies one transition deterministically.
    ///
    /// `Begin` is legal only from `Idle`, which is the guard that enforces
    /// single-flight semantics; `Settle` is legal only while awaiting.
    pub fn apply(&self, transition: SendTransition) -> SendTransitionResult {
        match (self, transition) {
            (Self::Idle, SendTransition::Begin) => Ok(Self::AwaitingResponse),
            (Self::AwaitingResponse, SendTransition::Begin) => {
                Err(SendRejection::RequestInFlight)
            }
            (Self::AwaitingResponse, SendTransition::Settle) => Ok(Self::Idle),
            (Self::Idle, SendTransition::Settle) => Err(SendRejection::NoRequestInFlight),
        }
    }
}
