use crate::{JobPhase, SessionId};

/// Visibility of the three content panels. All hidden initially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelVisibility {
    pub status: bool,
    pub query: bool,
    pub results: bool,
}

impl PanelVisibility {
    pub fn all_hidden(&self) -> bool {
        !self.status && !self.query && !self.results
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub panels: PanelVisibility,
    pub start_enabled: bool,
    pub query_enabled: bool,
    pub stop_pending: bool,
    pub phase: JobPhase,
    pub status_text: String,
    pub answer_text: String,
    /// Blocking message the front end must show before continuing.
    pub alert: Option<String>,
    pub session_id: Option<SessionId>,
    pub url_input: String,
    pub query_input: String,
    pub dirty: bool,
}
