use std::sync::Arc;

use confab_chat::{
    ChatSession, Conversation, ReplyOutcome, Role, SendState, SubmitOutcome, Turn, ViewSync,
};
use confab_respondent::mock::{ManualRespondent, ScriptedRespondent};
use confab_respondent::{Mode, RespondentError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn roles(conversation: &Conversation) -> Vec<Role> {
    conversation.turns().iter().map(Turn::role).collect()
}

#[tokio::test]
async fn submit_then_resolve_walks_the_full_cycle() {
    init_tracing();
    let respondent = Arc::new(ManualRespondent::new());
    let mut session = ChatSession::new(respondent.clone());

    // Seed state: framing then greeting, idle.
    assert_eq!(roles(session.conversation()), [Role::System, Role::Assistant]);
    assert_eq!(session.state(), SendState::Idle);
    assert!(!session.is_pending());

    // Immediately after submit: user turn appended, awaiting, one request out.
    assert_eq!(session.submit("hello"), SubmitOutcome::Accepted);
    assert_eq!(
        roles(session.conversation()),
        [Role::System, Role::Assistant, Role::User]
    );
    assert_eq!(
        session.conversation().last().map(Turn::content),
        Some("hello")
    );
    assert!(session.is_pending());
    assert_eq!(respondent.requests().len(), 1);

    // Resolution appends the paired assistant turn and returns to idle.
    assert!(respondent.resolve_with("hi there"));
    assert_eq!(session.await_reply().await, ReplyOutcome::Replied);
    assert_eq!(
        roles(session.conversation()),
        [Role::System, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(
        session.conversation().last().map(Turn::content),
        Some("hi there")
    );
    assert_eq!(session.state(), SendState::Idle);
}

#[tokio::test]
async fn second_submit_before_resolution_is_dropped() {
    init_tracing();
    let respondent = Arc::new(ManualRespondent::new());
    let mut session = ChatSession::new(respondent.clone());

    assert_eq!(session.submit("a"), SubmitOutcome::Accepted);
    assert_eq!(session.submit("b"), SubmitOutcome::RejectedBusy);

    // Only one user turn from the pair, only one request ever issued.
    let user_turns = session
        .conversation()
        .turns()
        .iter()
        .filter(|turn| turn.role() == Role::User)
        .map(Turn::content)
        .collect::<Vec<_>>();
    assert_eq!(user_turns, ["a"]);
    assert_eq!(respondent.requests().len(), 1);

    respondent.resolve_with("reply to a");
    session.await_reply().await;

    // "b" was dropped for good; it does not resurface after settling.
    let user_turns = session
        .conversation()
        .turns()
        .iter()
        .filter(|turn| turn.role() == Role::User)
        .map(Turn::content)
        .collect::<Vec<_>>();
    assert_eq!(user_turns, ["a"]);
    assert_eq!(session.state(), SendState::Idle);
}

#[tokio::test]
async fn every_pipeline_assistant_turn_pairs_with_its_prompt() {
    init_tracing();
    let respondent = Arc::new(ScriptedRespondent::with_replies(["one", "two", "three"]));
    let mut session = ChatSession::new(respondent.clone());

    for prompt in ["first", "second", "third"] {
        assert!(session.submit(prompt).is_accepted());
        assert_eq!(session.await_reply().await, ReplyOutcome::Replied);
    }

    let turns = session.conversation().turns();
    let requests = respondent.requests();
    let mut paired = 0;

    // Skip the seed greeting; every later assistant turn must be immediately
    // preceded by the user turn whose content was sent to the respondent.
    for (index, turn) in turns.iter().enumerate().skip(2) {
        if turn.role() != Role::Assistant {
            continue;
        }
        let user = &turns[index - 1];
        assert_eq!(user.role(), Role::User);
        assert_eq!(requests[paired].prompt, user.content());
        paired += 1;
    }
    assert_eq!(paired, 3);
}

#[tokio::test]
async fn respondent_failure_is_caught_at_the_boundary() {
    init_tracing();
    let respondent = Arc::new(ScriptedRespondent::new());
    respondent.push_result(Err(RespondentError::Unresolved {
        stage: "test-fixture",
    }));
    let mut session = ChatSession::new(respondent);

    assert!(session.submit("hello").is_accepted());
    let outcome = session.await_reply().await;

    let ReplyOutcome::Failed { notice } = outcome else {
        panic!("expected a failed outcome");
    };
    assert!(notice.starts_with("The assistant could not reply:"));

    // Pipeline is not stuck: back to idle, notice visible, next submit works.
    assert_eq!(session.state(), SendState::Idle);
    assert_eq!(
        session.conversation().last().map(Turn::role),
        Some(Role::System)
    );
    assert!(session.submit("again").is_accepted());
}

#[tokio::test]
async fn mode_tag_rides_along_without_affecting_the_pipeline() {
    init_tracing();
    let respondent = Arc::new(ScriptedRespondent::with_replies(["ok", "ok"]));
    let mut session = ChatSession::new(respondent.clone());

    session.set_mode(Mode::Precise);
    session.submit("q1");
    session.await_reply().await;

    session.set_mode(Mode::Fast);
    session.submit("q2");
    session.await_reply().await;

    let modes = respondent
        .requests()
        .iter()
        .map(|request| request.mode)
        .collect::<Vec<_>>();
    assert_eq!(modes, [Mode::Precise, Mode::Fast]);
    // Same transcript shape regardless of tag.
    assert_eq!(
        roles(session.conversation()),
        [
            Role::System,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
        ]
    );
}

/// Records the conversation length at every append notification.
struct RecordingViewSync {
    lengths: Arc<std::sync::Mutex<Vec<usize>>>,
}

impl ViewSync for RecordingViewSync {
    fn conversation_extended(&mut self, conversation: &Conversation) {
        self.lengths
            .lock()
            .expect("recorder state poisoned")
            .push(conversation.len());
    }
}

#[tokio::test]
async fn view_sync_observes_every_append_in_order() {
    init_tracing();
    let lengths = Arc::new(std::sync::Mutex::new(Vec::new()));
    let respondent = Arc::new(ScriptedRespondent::with_replies(["hi there"]));
    let mut session = ChatSession::new(respondent).with_view_sync(Box::new(RecordingViewSync {
        lengths: lengths.clone(),
    }));

    session.submit("hello");
    session.await_reply().await;

    // Seed appends happen before the observer is attached; the pipeline's two
    // appends (user turn, assistant turn) each notified with the new length.
    assert_eq!(*lengths.lock().expect("recorder state poisoned"), [3, 4]);
}
