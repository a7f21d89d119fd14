use clipquery_core::{
    update, AppState, Effect, JobId, JobStatus, Msg, PanelVisibility, SessionId,
    MSG_EMPTY_QUERY, MSG_NO_SESSION, MSG_STOPPED, MSG_STOP_FAILED,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    clipquery_logging::initialize_for_tests();
}

fn with_session(session: &str) -> AppState {
    let (state, _) = update(AppState::new(), Msg::UrlInputChanged("https://youtu.be/x".into()));
    let (state, effects) = update(state, Msg::StartClicked);
    let [Effect::StartJob { request, .. }] = effects.as_slice() else {
        panic!("expected a single StartJob, got {effects:?}");
    };
    let (state, _) = update(
        state,
        Msg::JobStarted {
            request: *request,
            job_id: JobId::new("job-1"),
        },
    );
    let (state, _) = update(
        state,
        Msg::JobStatusReceived {
            job_id: JobId::new("job-1"),
            status: JobStatus::Completed,
            message: Some("Ready to answer questions!".into()),
            result: Some(session.into()),
        },
    );
    state
}

fn ask(state: AppState, query: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::QueryInputChanged(query.to_string()));
    update(state, Msg::QueryClicked)
}

#[test]
fn query_without_session_alerts_without_effects() {
    init_logging();
    let (state, effects) = ask(AppState::new(), "What is said at 2:00?");

    assert!(effects.is_empty());
    assert_eq!(state.view().alert.as_deref(), Some(MSG_EMPTY_QUERY));
    assert!(!state.view().panels.results);
}

#[test]
fn empty_query_alerts_even_with_session() {
    init_logging();
    let (state, effects) = ask(with_session("sess-1"), "  ");

    assert!(effects.is_empty());
    assert_eq!(state.view().alert.as_deref(), Some(MSG_EMPTY_QUERY));
}

#[test]
fn query_shows_placeholder_and_disables_control() {
    init_logging();
    let (state, effects) = ask(with_session("sess-1"), "Who is speaking?");
    let view = state.view();

    assert_eq!(
        effects,
        vec![Effect::RunQuery {
            query: "Who is speaking?".to_string(),
            session_id: SessionId::new("sess-1"),
        }]
    );
    assert!(view.panels.results);
    assert_eq!(view.answer_text, "Thinking...");
    assert!(!view.query_enabled);

    let (_state, effects) = update(state, Msg::QueryClicked);
    assert!(effects.is_empty());
}

#[test]
fn answer_and_failure_reenable_query() {
    init_logging();
    let (state, _) = ask(with_session("sess-1"), "Who is speaking?");
    let (state, _) = update(
        state,
        Msg::QueryAnswered {
            answer: "A narrator.".into(),
        },
    );
    assert_eq!(state.view().answer_text, "A narrator.");
    assert!(state.view().query_enabled);

    let (state, _) = ask(state, "And then?");
    let (state, _) = update(
        state,
        Msg::QueryFailed {
            message: "Session expired or not found".into(),
        },
    );
    assert_eq!(
        state.view().answer_text,
        "Error: Session expired or not found"
    );
    assert!(state.view().query_enabled);
}

#[test]
fn stop_without_session_alerts() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::StopClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().alert.as_deref(), Some(MSG_NO_SESSION));
}

#[test]
fn stop_success_clears_session_and_hides_panels() {
    init_logging();
    let (state, _) = ask(with_session("sess-1"), "Anything?");
    let (state, effects) = update(state, Msg::StopClicked);
    assert_eq!(
        effects,
        vec![Effect::StopSession {
            session_id: SessionId::new("sess-1")
        }]
    );
    assert!(state.view().stop_pending);

    let (_, effects) = update(state.clone(), Msg::StopClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::SessionStopped);
    let view = state.view();
    assert_eq!(view.session_id, None);
    assert_eq!(view.panels, PanelVisibility::default());
    assert_eq!(view.alert.as_deref(), Some(MSG_STOPPED));
    assert!(!view.stop_pending);
}

#[test]
fn stop_failure_still_clears_session_and_hides_panels() {
    init_logging();
    let state = with_session("sess-1");
    let (state, _) = update(state, Msg::StopClicked);
    let (state, _) = update(
        state,
        Msg::SessionStopFailed {
            message: "connection refused".into(),
        },
    );
    let view = state.view();

    assert_eq!(view.session_id, None);
    assert!(view.panels.all_hidden());
    assert_eq!(view.alert.as_deref(), Some(MSG_STOP_FAILED));

    let (_state, effects) = ask(state, "Still there?");
    assert!(effects.is_empty());
}

#[test]
fn stray_stop_outcome_is_ignored() {
    init_logging();
    let state = with_session("sess-1");
    let (mut state, _) = update(state, Msg::AlertDismissed);
    state.consume_dirty();

    let (mut state, _) = update(state, Msg::SessionStopped);
    assert_eq!(state.view().session_id, Some(SessionId::new("sess-1")));
    assert!(!state.consume_dirty());
}
