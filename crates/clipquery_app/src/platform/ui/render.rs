use clipquery_core::{AppViewModel, JobPhase};

/// Renders the panels as text lines, one per visible panel plus the controls line.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if view.panels.status {
        lines.push(format!("[status] {}", view.status_text));
    }
    if view.panels.query {
        match &view.session_id {
            Some(session_id) => lines.push(format!("[query] ready, session {session_id}")),
            None => lines.push("[query] ready".to_string()),
        }
    }
    if view.panels.results {
        lines.push(format!("[answer] {}", view.answer_text));
    }

    lines.push(format!(
        "[controls] process: {} | ask: {}{}",
        enabled_label(view.start_enabled),
        enabled_label(view.query_enabled),
        phase_suffix(view)
    ));

    lines
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "busy"
    }
}

fn phase_suffix(view: &AppViewModel) -> String {
    let mut suffix = String::new();
    if let JobPhase::Polling(job_id) = &view.phase {
        suffix.push_str(&format!(" | job {job_id}"));
    }
    if view.stop_pending {
        suffix.push_str(" | stopping");
    }
    suffix
}
