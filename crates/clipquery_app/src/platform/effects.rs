use std::time::Duration;

use clipquery_core::{Effect, JobId, JobStatus, Msg};
use clipquery_engine::{EngineCommand, EngineEvent, EngineHandle, PollOutcome};
use clipquery_logging::{cq_debug, cq_info, cq_warn};

/// Bridges controller effects to the engine and engine events back to messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let command = match effect {
                Effect::StartJob { request, url } => EngineCommand::StartJob { request, url },
                Effect::PollJob { job_id } => EngineCommand::PollJob {
                    job_id: job_id.as_str().to_string(),
                },
                Effect::CancelPoll { job_id } => EngineCommand::CancelPoll {
                    job_id: job_id.as_str().to_string(),
                },
                Effect::RunQuery { query, session_id } => EngineCommand::Query {
                    query,
                    session_id: session_id.as_str().to_string(),
                },
                Effect::StopSession { session_id } => EngineCommand::StopSession {
                    session_id: session_id.as_str().to_string(),
                },
            };
            cq_debug!("Engine command {:?}", command);
            self.engine.send(command);
        }
    }

    pub fn try_recv(&self) -> Option<Msg> {
        loop {
            let event = self.engine.try_recv()?;
            if let Some(msg) = map_event(event) {
                return Some(msg);
            }
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        map_event(event).or_else(|| self.try_recv())
    }
}

/// Translates an engine event. Terminal poll outcomes already delivered as a
/// status report map to nothing.
fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::JobStarted { request, job_id } => Some(Msg::JobStarted {
            request,
            job_id: JobId::new(job_id),
        }),
        EngineEvent::JobStartFailed { request, error } => {
            cq_warn!("Starting job failed: {} ({})", error, error.kind);
            Some(Msg::JobStartFailed {
                request,
                message: error.message,
            })
        }
        EngineEvent::JobStatus { job_id, report } => Some(Msg::JobStatusReceived {
            job_id: JobId::new(job_id),
            status: map_status(report.status),
            message: report.message,
            result: report.result,
        }),
        EngineEvent::JobPollFinished { job_id, outcome } => match outcome {
            PollOutcome::TransportError(error) => Some(Msg::JobPollFailed {
                job_id: JobId::new(job_id),
                message: error.message,
            }),
            PollOutcome::GaveUp { attempts } => Some(Msg::JobPollGaveUp {
                job_id: JobId::new(job_id),
                attempts,
            }),
            other => {
                cq_debug!("Poll for job {} finished: {:?}", job_id, other);
                None
            }
        },
        EngineEvent::QueryAnswered { answer } => Some(Msg::QueryAnswered { answer }),
        EngineEvent::QueryFailed { error } => {
            cq_warn!("Query failed: {} ({})", error, error.kind);
            Some(Msg::QueryFailed {
                message: error.message,
            })
        }
        EngineEvent::SessionStopped {
            session_id,
            message,
        } => {
            cq_info!(
                "Session {} stopped: {}",
                session_id,
                message.as_deref().unwrap_or("no message")
            );
            Some(Msg::SessionStopped)
        }
        EngineEvent::SessionStopFailed { session_id, error } => Some(Msg::SessionStopFailed {
            message: format!("{session_id}: {error}"),
        }),
    }
}

fn map_status(status: clipquery_engine::JobStatus) -> JobStatus {
    match status {
        clipquery_engine::JobStatus::Pending => JobStatus::Pending,
        clipquery_engine::JobStatus::Processing => JobStatus::Processing,
        clipquery_engine::JobStatus::Completed => JobStatus::Completed,
        clipquery_engine::JobStatus::Failed => JobStatus::Failed,
    }
}
