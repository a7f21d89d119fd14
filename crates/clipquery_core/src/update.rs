use clipquery_logging::{cq_debug, cq_error, cq_info, cq_warn};

use crate::{AppState, Effect, JobId, JobPhase, JobStatus, Msg, SessionId};

pub const MSG_EMPTY_URL: &str = "Please enter a YouTube URL.";
pub const MSG_EMPTY_QUERY: &str = "Please enter a query and ensure a video is processed.";
pub const MSG_NO_SESSION: &str = "No active session to stop.";
pub const MSG_STOPPED: &str = "Session has been stopped. You can now process a new video.";
pub const MSG_STOP_FAILED: &str = "Could not stop the session. Please check the log.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlInputChanged(text) => {
            state.set_url_input(text);
            Vec::new()
        }
        Msg::QueryInputChanged(text) => {
            state.set_query_input(text);
            Vec::new()
        }
        Msg::StartClicked => start_clicked(&mut state),
        Msg::JobStarted { request, job_id } => {
            if !state.is_starting(request) {
                cq_warn!(
                    "Ignoring job {} from abandoned start request {}",
                    job_id,
                    request
                );
                return (state, Vec::new());
            }
            cq_info!("Job {} accepted, polling", job_id);
            state.begin_polling(job_id.clone());
            vec![Effect::PollJob { job_id }]
        }
        Msg::JobStartFailed { request, message } => {
            if state.is_starting(request) {
                state.set_status_text(format!("Error: {message}"));
                state.finish_job();
            } else {
                cq_debug!("Ignoring failure of abandoned start request {}", request);
            }
            Vec::new()
        }
        Msg::JobStatusReceived {
            job_id,
            status,
            message,
            result,
        } => {
            apply_status(&mut state, &job_id, status, message, result);
            Vec::new()
        }
        Msg::JobPollFailed { job_id, message } => {
            if state.is_polling(&job_id) {
                state.set_status_text(format!("Error polling status: {message}"));
                state.finish_job();
            }
            Vec::new()
        }
        Msg::JobPollGaveUp { job_id, attempts } => {
            if state.is_polling(&job_id) {
                state.set_status_text(format!(
                    "Error: job did not finish after {attempts} status checks"
                ));
                state.finish_job();
            }
            Vec::new()
        }
        Msg::CancelClicked => match state.phase().clone() {
            JobPhase::Idle => Vec::new(),
            JobPhase::Starting => {
                state.set_status_text("Cancelled.");
                state.finish_job();
                Vec::new()
            }
            JobPhase::Polling(job_id) => {
                cq_info!("Cancelling poll for job {}", job_id);
                state.set_status_text("Cancelled.");
                state.finish_job();
                vec![Effect::CancelPoll { job_id }]
            }
        },
        Msg::QueryClicked => query_clicked(&mut state),
        Msg::QueryAnswered { answer } => {
            state.finish_query(answer);
            Vec::new()
        }
        Msg::QueryFailed { message } => {
            state.finish_query(format!("Error: {message}"));
            Vec::new()
        }
        Msg::StopClicked => {
            let Some(session_id) = state.session_id().cloned() else {
                state.raise_alert(MSG_NO_SESSION);
                return (state, Vec::new());
            };
            if !state.begin_stop() {
                return (state, Vec::new());
            }
            vec![Effect::StopSession { session_id }]
        }
        Msg::SessionStopped => {
            if state.is_stop_in_flight() {
                state.raise_alert(MSG_STOPPED);
                state.close_session();
            }
            Vec::new()
        }
        Msg::SessionStopFailed { message } => {
            if state.is_stop_in_flight() {
                cq_error!("Failed to stop session: {}", message);
                state.raise_alert(MSG_STOP_FAILED);
                state.close_session();
            }
            Vec::new()
        }
        Msg::AlertDismissed => {
            state.dismiss_alert();
            Vec::new()
        }
    };

    (state, effects)
}

/// Whitespace-only input counts as empty; the trimmed URL is what gets sent.
fn start_clicked(state: &mut AppState) -> Vec<Effect> {
    if *state.phase() != JobPhase::Idle {
        return Vec::new();
    }
    let url = state.url_input().trim().to_string();
    if url.is_empty() {
        state.raise_alert(MSG_EMPTY_URL);
        return Vec::new();
    }
    let request = state.begin_start();
    vec![Effect::StartJob { request, url }]
}

fn apply_status(
    state: &mut AppState,
    job_id: &JobId,
    status: JobStatus,
    message: Option<String>,
    result: Option<String>,
) {
    if !state.is_polling(job_id) {
        cq_debug!("Ignoring stale status for job {}", job_id);
        return;
    }

    let message = message.filter(|text| !text.is_empty());
    state.set_status_text(message.clone().unwrap_or_else(|| "Processing...".to_string()));

    match status {
        JobStatus::Pending | JobStatus::Processing => {}
        JobStatus::Completed => match result.filter(|id| !id.is_empty()) {
            Some(session_id) => {
                cq_info!("Job {} completed with session {}", job_id, session_id);
                state.open_session(SessionId::new(session_id));
            }
            None => {
                cq_warn!("Job {} completed without a session id", job_id);
                state.set_status_text("Error: job completed without a session id");
                state.finish_job();
            }
        },
        JobStatus::Failed => {
            let message = message.unwrap_or_else(|| "job failed".to_string());
            state.set_status_text(format!("Error: {message}"));
            state.finish_job();
        }
    }
}

fn query_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.is_query_in_flight() {
        return Vec::new();
    }
    let query = state.query_input().trim().to_string();
    let session_id = match state.session_id() {
        Some(session_id) if !query.is_empty() => session_id.clone(),
        _ => {
            state.raise_alert(MSG_EMPTY_QUERY);
            return Vec::new();
        }
    };
    state.begin_query();
    vec![Effect::RunQuery { query, session_id }]
}
