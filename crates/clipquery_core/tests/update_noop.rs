use clipquery_core::{update, AppState, Msg};

#[test]
fn idle_messages_change_nothing() {
    let state = AppState::new();
    for msg in [
        Msg::AlertDismissed,
        Msg::CancelClicked,
        Msg::SessionStopped,
        Msg::JobStartFailed {
            request: 1,
            message: "late".into(),
        },
    ] {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
