use std::fmt;

use crate::view_model::{AppViewModel, PanelVisibility};

/// Opaque job identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session identifier handed out when a job completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Where the controller is in the start/poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    /// Start request sent, waiting for a job id.
    Starting,
    Polling(JobId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    url_input: String,
    query_input: String,
    session_id: Option<SessionId>,
    phase: JobPhase,
    /// Counts start requests so replies to an abandoned start can be told apart.
    start_request: u64,
    panels: PanelVisibility,
    query_in_flight: bool,
    stop_in_flight: bool,
    status_text: String,
    answer_text: String,
    alert: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            panels: self.panels,
            start_enabled: self.phase == JobPhase::Idle,
            query_enabled: !self.query_in_flight,
            stop_pending: self.stop_in_flight,
            phase: self.phase.clone(),
            status_text: self.status_text.clone(),
            answer_text: self.answer_text.clone(),
            alert: self.alert.clone(),
            session_id: self.session_id.clone(),
            url_input: self.url_input.clone(),
            query_input: self.query_input.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    pub(crate) fn url_input(&self) -> &str {
        &self.url_input
    }

    pub(crate) fn query_input(&self) -> &str {
        &self.query_input
    }

    pub(crate) fn set_url_input(&mut self, text: String) {
        if self.url_input != text {
            self.url_input = text;
            self.dirty = true;
        }
    }

    pub(crate) fn set_query_input(&mut self, text: String) {
        if self.query_input != text {
            self.query_input = text;
            self.dirty = true;
        }
    }

    pub(crate) fn raise_alert(&mut self, text: &str) {
        self.alert = Some(text.to_string());
        self.dirty = true;
    }

    pub(crate) fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn set_status_text(&mut self, text: impl Into<String>) {
        self.status_text = text.into();
        self.dirty = true;
    }

    /// Enters the starting phase and returns the id of the new start request.
    pub(crate) fn begin_start(&mut self) -> u64 {
        self.start_request = self.start_request.wrapping_add(1);
        self.panels = PanelVisibility {
            status: true,
            query: false,
            results: false,
        };
        self.phase = JobPhase::Starting;
        self.status_text = "Starting job...".to_string();
        self.dirty = true;
        self.start_request
    }

    pub(crate) fn is_starting(&self, request: u64) -> bool {
        self.phase == JobPhase::Starting && self.start_request == request
    }

    pub(crate) fn begin_polling(&mut self, job_id: JobId) {
        self.phase = JobPhase::Polling(job_id);
        self.dirty = true;
    }

    /// Ends the start/poll cycle and re-enables the start control.
    pub(crate) fn finish_job(&mut self) {
        self.phase = JobPhase::Idle;
        self.dirty = true;
    }

    pub(crate) fn is_polling(&self, job_id: &JobId) -> bool {
        matches!(&self.phase, JobPhase::Polling(active) if active == job_id)
    }

    pub(crate) fn open_session(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
        self.panels.status = false;
        self.panels.query = true;
        self.phase = JobPhase::Idle;
        self.dirty = true;
    }

    pub(crate) fn begin_query(&mut self) {
        self.panels.results = true;
        self.answer_text = "Thinking...".to_string();
        self.query_in_flight = true;
        self.dirty = true;
    }

    pub(crate) fn finish_query(&mut self, answer: String) {
        self.answer_text = answer;
        self.query_in_flight = false;
        self.dirty = true;
    }

    pub(crate) fn is_query_in_flight(&self) -> bool {
        self.query_in_flight
    }

    pub(crate) fn begin_stop(&mut self) -> bool {
        if self.stop_in_flight {
            return false;
        }
        self.stop_in_flight = true;
        self.dirty = true;
        true
    }

    pub(crate) fn is_stop_in_flight(&self) -> bool {
        self.stop_in_flight
    }

    /// Hides every panel and forgets the session, whatever the stop outcome was.
    pub(crate) fn close_session(&mut self) {
        self.stop_in_flight = false;
        self.session_id = None;
        self.panels = PanelVisibility::default();
        self.dirty = true;
    }
}
