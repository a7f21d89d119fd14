use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clipquery_engine::{
    ApiClient, ApiError, ApiErrorKind, ClientSettings, EngineCommand, EngineEvent, EngineHandle,
    JobStatus, JobStatusReport, PollOutcome, PollSettings, ReqwestApiClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TICK: Duration = Duration::from_millis(20);

/// In-memory backend replaying scripted status reports.
#[derive(Default)]
struct ScriptedClient {
    statuses: Mutex<VecDeque<JobStatusReport>>,
    status_calls: AtomicUsize,
    fail_stop: bool,
}

impl ScriptedClient {
    fn with_statuses(statuses: Vec<JobStatusReport>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }
}

fn report(status: JobStatus, result: Option<&str>) -> JobStatusReport {
    JobStatusReport {
        status,
        message: None,
        result: result.map(ToOwned::to_owned),
    }
}

#[async_trait::async_trait]
impl ApiClient for ScriptedClient {
    async fn start_job(&self, url: &str) -> Result<String, ApiError> {
        Ok(format!("job-for-{url}"))
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatusReport, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| report(JobStatus::Processing, None)))
    }

    async fn query(&self, query: &str, session_id: &str) -> Result<String, ApiError> {
        Ok(format!("{session_id}: {query}"))
    }

    async fn stop_session(&self, _session_id: &str) -> Result<Option<String>, ApiError> {
        if self.fail_stop {
            Err(ApiError {
                kind: ApiErrorKind::Network,
                message: "connection refused".into(),
            })
        } else {
            Ok(None)
        }
    }
}

fn engine_with(client: Arc<dyn ApiClient>) -> EngineHandle {
    EngineHandle::new(
        client,
        PollSettings {
            interval: TICK,
            ..PollSettings::default()
        },
    )
    .expect("engine")
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(Duration::from_secs(5))
        .expect("engine event")
}

fn collect_until_poll_finished(engine: &EngineHandle) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    loop {
        let event = next_event(engine);
        let done = matches!(event, EngineEvent::JobPollFinished { .. });
        events.push(event);
        if done {
            return events;
        }
    }
}

#[test]
fn start_poll_query_and_stop_round_trip() {
    let client = Arc::new(ScriptedClient::with_statuses(vec![
        report(JobStatus::Pending, None),
        report(JobStatus::Pending, None),
        report(JobStatus::Completed, Some("sess-1")),
    ]));
    let engine = engine_with(client.clone());

    engine.send(EngineCommand::StartJob {
        request: 7,
        url: "v".into(),
    });
    assert_eq!(
        next_event(&engine),
        EngineEvent::JobStarted {
            request: 7,
            job_id: "job-for-v".into()
        }
    );

    engine.send(EngineCommand::PollJob {
        job_id: "job-for-v".into(),
    });
    let events = collect_until_poll_finished(&engine);
    assert_eq!(events.len(), 4);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::JobPollFinished {
            job_id: "job-for-v".into(),
            outcome: PollOutcome::Completed {
                session_id: Some("sess-1".into())
            },
        })
    );
    std::thread::sleep(TICK * 4);
    assert_eq!(client.status_calls.load(Ordering::SeqCst), 3);

    engine.send(EngineCommand::Query {
        query: "who?".into(),
        session_id: "sess-1".into(),
    });
    assert_eq!(
        next_event(&engine),
        EngineEvent::QueryAnswered {
            answer: "sess-1: who?".into()
        }
    );

    engine.send(EngineCommand::StopSession {
        session_id: "sess-1".into(),
    });
    assert_eq!(
        next_event(&engine),
        EngineEvent::SessionStopped {
            session_id: "sess-1".into(),
            message: None,
        }
    );
}

#[test]
fn cancel_poll_reports_cancelled_and_stops_fetching() {
    let client = Arc::new(ScriptedClient::default());
    let engine = engine_with(client.clone());

    engine.send(EngineCommand::PollJob {
        job_id: "job-1".into(),
    });
    // Wait for at least one status before cancelling.
    assert!(matches!(
        next_event(&engine),
        EngineEvent::JobStatus { .. }
    ));
    engine.send(EngineCommand::CancelPoll {
        job_id: "job-1".into(),
    });

    let events = collect_until_poll_finished(&engine);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::JobPollFinished {
            job_id: "job-1".into(),
            outcome: PollOutcome::Cancelled,
        })
    );

    let calls = client.status_calls.load(Ordering::SeqCst);
    std::thread::sleep(TICK * 4);
    assert_eq!(client.status_calls.load(Ordering::SeqCst), calls);
}

#[test]
fn stop_failure_is_reported() {
    let client = Arc::new(ScriptedClient {
        fail_stop: true,
        ..ScriptedClient::default()
    });
    let engine = engine_with(client);

    engine.send(EngineCommand::StopSession {
        session_id: "sess-1".into(),
    });
    match next_event(&engine) {
        EngineEvent::SessionStopFailed { session_id, error } => {
            assert_eq!(session_id, "sess-1");
            assert_eq!(error.kind, ApiErrorKind::Network);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn try_recv_is_empty_without_commands() {
    let engine = engine_with(Arc::new(ScriptedClient::default()));
    let started = Instant::now();
    assert_eq!(engine.try_recv(), None);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_drives_real_http_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process-video-async"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "job-1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job-status/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "message": "Video unavailable"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestApiClient::new(&ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .unwrap();
    let engine = engine_with(Arc::new(client));

    engine.send(EngineCommand::StartJob {
        request: 1,
        url: "https://youtu.be/gone".into(),
    });
    let job_id = match next_event(&engine) {
        EngineEvent::JobStarted { request: 1, job_id } => job_id,
        other => panic!("unexpected event {other:?}"),
    };
    engine.send(EngineCommand::PollJob { job_id });

    let events = collect_until_poll_finished(&engine);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::JobPollFinished {
            job_id: "job-1".into(),
            outcome: PollOutcome::Failed {
                message: Some("Video unavailable".into())
            },
        })
    );
    tokio::time::sleep(TICK * 4).await;
    server.verify().await;
}
