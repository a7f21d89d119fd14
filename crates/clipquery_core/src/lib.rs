//! Clipquery core: pure controller state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, JobId, JobPhase, JobStatus, SessionId};
pub use update::{
    update, MSG_EMPTY_QUERY, MSG_EMPTY_URL, MSG_NO_SESSION, MSG_STOPPED, MSG_STOP_FAILED,
};
pub use view_model::{AppViewModel, PanelVisibility};
