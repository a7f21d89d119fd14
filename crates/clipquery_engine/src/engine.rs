use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clipquery_logging::{cq_debug, cq_info, cq_warn};
use tokio_util::sync::CancellationToken;

use crate::poll::{poll_job, PollEvent, PollSettings, PollSink};
use crate::{ApiClient, EngineEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    StartJob { request: u64, url: String },
    PollJob { job_id: String },
    CancelPoll { job_id: String },
    Query { query: String, session_id: String },
    StopSession { session_id: String },
}

/// Runs backend requests on a background tokio runtime.
///
/// Commands go in through [`EngineHandle::send`]; results come back as
/// [`EngineEvent`]s in the order they complete.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(client: Arc<dyn ApiClient>, poll_settings: PollSettings) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("clipquery-engine".to_string())
            .spawn(move || {
                let mut polls: HashMap<String, CancellationToken> = HashMap::new();
                while let Ok(command) = cmd_rx.recv() {
                    // Finished polls cancel their own token on exit.
                    polls.retain(|_, token| !token.is_cancelled());
                    dispatch(
                        &runtime,
                        &client,
                        &poll_settings,
                        &mut polls,
                        command,
                        &event_tx,
                    );
                }
                for token in polls.values() {
                    token.cancel();
                }
                cq_debug!("Engine command loop stopped");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            cq_warn!("Engine thread is gone; command dropped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn dispatch(
    runtime: &tokio::runtime::Runtime,
    client: &Arc<dyn ApiClient>,
    poll_settings: &PollSettings,
    polls: &mut HashMap<String, CancellationToken>,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let client = client.clone();
    let event_tx = event_tx.clone();
    match command {
        EngineCommand::StartJob { request, url } => {
            cq_info!(
                "Starting job request={} url_len={} url={}",
                request,
                url.len(),
                url
            );
            runtime.spawn(async move {
                let event = match client.start_job(&url).await {
                    Ok(job_id) => EngineEvent::JobStarted { request, job_id },
                    Err(error) => EngineEvent::JobStartFailed { request, error },
                };
                let _ = event_tx.send(event);
            });
        }
        EngineCommand::PollJob { job_id } => {
            let token = CancellationToken::new();
            if let Some(previous) = polls.insert(job_id.clone(), token.clone()) {
                cq_debug!("Replacing running poll for job {}", job_id);
                previous.cancel();
            }
            let settings = poll_settings.clone();
            runtime.spawn(async move {
                let _guard = token.clone().drop_guard();
                let sink = ChannelPollSink {
                    job_id: job_id.clone(),
                    tx: event_tx.clone(),
                };
                let outcome = poll_job(client.as_ref(), &job_id, &settings, &token, &sink).await;
                let _ = event_tx.send(EngineEvent::JobPollFinished { job_id, outcome });
            });
        }
        EngineCommand::CancelPoll { job_id } => match polls.remove(&job_id) {
            Some(token) => token.cancel(),
            None => cq_debug!("No running poll for job {}", job_id),
        },
        EngineCommand::Query { query, session_id } => {
            runtime.spawn(async move {
                let event = match client.query(&query, &session_id).await {
                    Ok(answer) => EngineEvent::QueryAnswered { answer },
                    Err(error) => EngineEvent::QueryFailed { error },
                };
                let _ = event_tx.send(event);
            });
        }
        EngineCommand::StopSession { session_id } => {
            runtime.spawn(async move {
                let event = match client.stop_session(&session_id).await {
                    Ok(message) => EngineEvent::SessionStopped {
                        session_id,
                        message,
                    },
                    Err(error) => EngineEvent::SessionStopFailed { session_id, error },
                };
                let _ = event_tx.send(event);
            });
        }
    }
}

struct ChannelPollSink {
    job_id: String,
    tx: mpsc::Sender<EngineEvent>,
}

impl PollSink for ChannelPollSink {
    fn emit(&self, event: PollEvent) {
        let PollEvent::Status { report, .. } = event;
        let _ = self.tx.send(EngineEvent::JobStatus {
            job_id: self.job_id.clone(),
            report,
        });
    }
}
