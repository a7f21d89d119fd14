use std::time::Duration;

use clipquery_logging::{cq_debug, cq_trace, cq_warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{ApiClient, JobStatus, JobStatusReport, PollOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Stop after this many status fetches. `None` polls until a terminal status.
    pub max_attempts: Option<u32>,
    /// Stop once this much time has passed since polling began.
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: None,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Status { attempt: u32, report: JobStatusReport },
}

pub trait PollSink: Send + Sync {
    fn emit(&self, event: PollEvent);
}

/// Polls `job_id` until the job completes or fails, polling ends on an error
/// or limit, or `cancel` fires.
///
/// The first fetch happens one interval after the call. A tick never starts
/// while the previous fetch is still in flight; cancelling drops the
/// in-flight request.
pub async fn poll_job(
    client: &dyn ApiClient,
    job_id: &str,
    settings: &PollSettings,
    cancel: &CancellationToken,
    sink: &dyn PollSink,
) -> PollOutcome {
    let started = Instant::now();
    // A zero period makes the interval panic.
    let period = settings.interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(started + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts: u32 = 0;

    loop {
        if settings.max_attempts.is_some_and(|max| attempts >= max) {
            cq_warn!("Giving up on job {} after {} attempts", job_id, attempts);
            return PollOutcome::GaveUp { attempts };
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        if settings
            .timeout
            .is_some_and(|timeout| started.elapsed() >= timeout)
        {
            cq_warn!("Giving up on job {} after {:?}", job_id, started.elapsed());
            return PollOutcome::GaveUp { attempts };
        }

        attempts += 1;
        cq_trace!("Polling job {} attempt {}", job_id, attempts);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = client.job_status(job_id) => result,
        };

        let report = match result {
            Ok(report) => report,
            Err(err) => {
                cq_warn!("Polling job {} failed: {} ({})", job_id, err, err.kind);
                return PollOutcome::TransportError(err);
            }
        };

        sink.emit(PollEvent::Status {
            attempt: attempts,
            report: report.clone(),
        });

        match report.status {
            JobStatus::Completed => {
                cq_debug!("Job {} completed after {} attempts", job_id, attempts);
                return PollOutcome::Completed {
                    session_id: report.result,
                };
            }
            JobStatus::Failed => {
                return PollOutcome::Failed {
                    message: report.message,
                };
            }
            JobStatus::Pending | JobStatus::Processing => {}
        }
    }
}
